//! Request handler module
//!
//! Routes requests to the ingestion endpoint and the script endpoint.

pub mod ingest;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::{handle_request, RouteTable};
