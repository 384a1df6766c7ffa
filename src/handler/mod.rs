//! Request handler module
//!
//! Turns a hyper request into a response: built-in endpoints, route
//! resolution, body collection and catalog dispatch.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
