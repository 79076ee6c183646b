//! Request handler module
//!
//! Entry point for HTTP requests: method validation, path routing and
//! access logging around the gateway router.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
