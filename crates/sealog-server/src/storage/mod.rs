//! Attachment directories
//!
//! Every cruise and lowering owns a directory named after its id under the
//! configured root. Only the directory itself is managed here; uploads are
//! handled by a separate service.

use sealog_common::types::EntityKind;
use std::{
    io,
    path::{Path, PathBuf},
};
use uuid::Uuid;

use crate::config::AttachmentConfig;

#[derive(Debug, Clone)]
pub struct AttachmentStore {
    cruise_root: PathBuf,
    lowering_root: PathBuf,
}

impl AttachmentStore {
    pub fn new(cruise_root: impl Into<PathBuf>, lowering_root: impl Into<PathBuf>) -> Self {
        Self {
            cruise_root: cruise_root.into(),
            lowering_root: lowering_root.into(),
        }
    }

    pub fn from_config(config: &AttachmentConfig) -> Self {
        Self::new(&config.cruise_path, &config.lowering_path)
    }

    fn root(&self, kind: EntityKind) -> &Path {
        match kind {
            EntityKind::Cruise => &self.cruise_root,
            EntityKind::Lowering => &self.lowering_root,
        }
    }

    pub fn dir(&self, kind: EntityKind, id: Uuid) -> PathBuf {
        self.root(kind).join(id.to_string())
    }

    /// Create both roots if missing.
    pub async fn ensure_roots(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.cruise_root).await?;
        tokio::fs::create_dir_all(&self.lowering_root).await
    }

    /// File names in the record's directory, sorted; empty when unreadable.
    pub async fn list(&self, kind: EntityKind, id: Uuid) -> Vec<String> {
        let mut entries = match tokio::fs::read_dir(self.dir(kind, id)).await {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut names = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        names
    }

    pub async fn create(&self, kind: EntityKind, id: Uuid) -> io::Result<()> {
        tokio::fs::create_dir_all(self.dir(kind, id)).await
    }

    /// Remove the record's directory; a missing directory is not an error.
    pub async fn remove(&self, kind: EntityKind, id: Uuid) -> io::Result<()> {
        match tokio::fs::remove_dir_all(self.dir(kind, id)).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Remove every directory under the kind's root, leaving an empty root.
    pub async fn clear(&self, kind: EntityKind) -> io::Result<()> {
        let root = self.root(kind);
        match tokio::fs::remove_dir_all(root).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
            _ => {},
        }
        tokio::fs::create_dir_all(root).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_lifecycle() {
        let tmp = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(tmp.path().join("cruises"), tmp.path().join("lowerings"));
        store.ensure_roots().await.unwrap();
        let id = Uuid::new_v4();

        assert!(store.list(EntityKind::Cruise, id).await.is_empty());

        store.create(EntityKind::Cruise, id).await.unwrap();
        let dir = store.dir(EntityKind::Cruise, id);
        tokio::fs::write(dir.join("b.pdf"), b"b").await.unwrap();
        tokio::fs::write(dir.join("a.png"), b"a").await.unwrap();
        assert_eq!(store.list(EntityKind::Cruise, id).await, vec!["a.png", "b.pdf"]);
        assert!(store.list(EntityKind::Lowering, id).await.is_empty());

        store.remove(EntityKind::Cruise, id).await.unwrap();
        assert!(!dir.exists());
        store.remove(EntityKind::Cruise, id).await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_empties_only_one_root() {
        let tmp = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(tmp.path().join("cruises"), tmp.path().join("lowerings"));
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
        store.create(EntityKind::Cruise, first).await.unwrap();
        store.create(EntityKind::Cruise, second).await.unwrap();
        store.create(EntityKind::Lowering, first).await.unwrap();

        store.clear(EntityKind::Cruise).await.unwrap();
        assert!(tmp.path().join("cruises").is_dir());
        assert!(!store.dir(EntityKind::Cruise, first).exists());
        assert!(!store.dir(EntityKind::Cruise, second).exists());
        assert!(store.dir(EntityKind::Lowering, first).exists());

        tokio::fs::remove_dir_all(tmp.path().join("lowerings")).await.unwrap();
        store.clear(EntityKind::Lowering).await.unwrap();
        assert!(tmp.path().join("lowerings").is_dir());
    }
}
