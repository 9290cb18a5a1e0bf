//! Cruise write operations

pub mod bump;
pub mod create;
pub mod delete;
pub mod permissions;
pub mod update;

pub use create::CreateCruiseCommand;
pub use permissions::UpdatePermissionsCommand;
pub use update::UpdateCruiseCommand;
