//! HTTP protocol layer module
//!
//! Response builders and the CORS policy, shared by every route.

pub mod cors;
pub mod response;

// Re-export commonly used types
pub use cors::CorsPolicy;
pub use response::{
    build_404_response, build_405_response, build_options_response, build_script_response,
    error_response, ok_response, FILE_NOT_FOUND_MESSAGE, INVALID_JSON_MESSAGE,
};
