//! Static file serving module
//!
//! Serves the collector script from its configured location.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::path::Path;
use tokio::fs;

use crate::http::{self, FILE_NOT_FOUND_MESSAGE};
use crate::logger;

/// Serve the script file, 404 on any read failure
pub async fn serve_script(path: &Path, is_head: bool) -> Response<Full<Bytes>> {
    match fs::read(path).await {
        Ok(content) => http::build_script_response(Bytes::from(content), is_head),
        Err(e) => {
            logger::log_script_failed(path, &e);
            http::error_response(StatusCode::NOT_FOUND, FILE_NOT_FOUND_MESSAGE)
        }
    }
}
