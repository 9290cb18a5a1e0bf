//! Sealog Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging setup and error handling for the Sealog workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`SealogError`] and the [`Result`] alias
//! - **Logging**: [`logging::init_logging`] driven by [`logging::LogConfig`]
//! - **Types**: the logbook domain model (cruises, lowerings, events) and
//!   the per-request caller [`types::Identity`]
//!
//! # Example
//!
//! ```no_run
//! use sealog_common::types::parse_record_id;
//!
//! fn lookup(raw: &str) -> sealog_common::Result<()> {
//!     let id = parse_record_id(raw)?;
//!     tracing::info!(%id, "looking up record");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SealogError};
