//! Routing module
//!
//! Provides path-template routing:
//! - `{param}` template matching with percent-decoded captures
//! - method-aware resolution (404 vs 405)
//! - trailing-slash redirect lookup

mod matcher;
mod table;

pub use table::{Resolution, Router};
