//! Lowerings: dives and deployments inside a cruise

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::lowerings_routes;

/// Role allowed to read lowerings and request a bump
pub const READ_ROLE: &str = "read_lowerings";
/// Role allowed to create and delete lowerings
pub const CREATE_ROLE: &str = "create_lowerings";
/// Role allowed to edit lowerings and their permissions
pub const WRITE_ROLE: &str = "write_lowerings";
