//! Lowering write operations

pub mod bump;
pub mod create;
pub mod delete;
pub mod permissions;
pub mod update;

pub use create::CreateLoweringCommand;
pub use permissions::UpdatePermissionsCommand;
pub use update::UpdateLoweringCommand;
