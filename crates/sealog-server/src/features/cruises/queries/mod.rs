//! Cruise read operations

pub mod get;
pub mod joins;
pub mod list;

pub use list::ListCruisesQuery;
