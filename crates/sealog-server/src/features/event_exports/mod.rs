//! Event exports scoped to a cruise or lowering
//!
//! Events carry no visibility of their own. They are readable through the
//! record whose window contains them, so the parent is checked first and
//! the event window is clamped to it.

pub mod queries;
pub mod routes;

pub use routes::event_exports_routes;
