use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The verified caller of a single request.
///
/// Built once per request by the authentication layer and only ever read
/// afterwards. An identity without an id is anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    id: Option<String>,
    roles: BTreeSet<String>,
}

impl Identity {
    pub const ADMIN_ROLE: &'static str = "admin";

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user<I, R>(id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            id: Some(id.into()),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    pub fn is_authenticated(&self) -> bool {
        self.id.is_some()
    }

    /// Roles only count for authenticated callers.
    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.roles.contains(Self::ADMIN_ROLE)
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        self.is_authenticated() && roles.iter().any(|role| self.roles.contains(*role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_is_never_admin() {
        let identity = Identity {
            id: None,
            roles: ["admin".to_string()].into_iter().collect(),
        };
        assert!(!identity.is_authenticated());
        assert!(!identity.is_admin());
        assert!(!identity.has_any_role(&["admin"]));
    }

    #[test]
    fn test_user_roles() {
        let identity = Identity::user("u1", ["read_cruises", "write_cruises"]);
        assert!(identity.is_authenticated());
        assert!(!identity.is_admin());
        assert!(identity.has_any_role(&["admin", "write_cruises"]));
        assert!(!identity.has_any_role(&["create_cruises"]));
        assert_eq!(identity.id(), Some("u1"));

        assert!(Identity::user("root", ["admin"]).is_admin());
    }
}
