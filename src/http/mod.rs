//! HTTP protocol layer module
//!
//! Request and response types shared by the dispatcher, the handlers and the connection layer.

pub mod request;
pub mod response;

// Re-export commonly used types
pub use request::{Method, Request};
pub use response::Response;
