//! HTTP protocol layer module
//!
//! Transport helpers shared by the dispatcher: response builders and
//! query-string decoding, decoupled from the catalog endpoints.

pub mod query;
pub mod response;

// Re-export commonly used types
pub use query::parse_query;
pub use response::{
    apply_common_headers, build_400_response, build_404_response, build_405_response,
    build_413_response, build_422_response, build_500_response, build_json_bytes,
    build_redirect_response, json_response,
};
