//! Shared HTTP response plumbing

pub mod response;

pub use response::{csv_response, ApiResponse, ErrorResponse, ResponseFormat};
