//! Cruises: the parent expedition records
//!
//! Visibility changes on a cruise cascade to the lowerings inside its
//! window (see [`cascade`]).

pub mod cascade;
pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::cruises_routes;

/// Role allowed to read cruises and request a bump
pub const READ_ROLE: &str = "read_cruises";
/// Role allowed to create and delete cruises
pub const CREATE_ROLE: &str = "create_cruises";
/// Role allowed to edit cruises and their permissions
pub const WRITE_ROLE: &str = "write_cruises";
