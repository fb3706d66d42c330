//! CORS policy module
//!
//! Decides the `Access-Control-*` headers for a request origin.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, VARY,
};
use hyper::Response;

const PREFLIGHT_MAX_AGE: &str = "86400";
const DEFAULT_ALLOW_HEADERS: &str = "Content-Type";

/// Allowed origins, built once from configuration
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_any: bool,
    origins: Vec<String>,
}

impl CorsPolicy {
    pub fn from_origins(origins: &[String]) -> Self {
        Self {
            allow_any: origins.iter().any(|o| o == "*"),
            origins: origins
                .iter()
                .filter(|o| o.as_str() != "*")
                .map(|o| o.trim_end_matches('/').to_string())
                .collect(),
        }
    }

    /// Value for `Access-Control-Allow-Origin`, `None` when the origin is refused
    pub fn allow_origin(&self, origin: Option<&str>) -> Option<String> {
        if self.allow_any {
            return Some("*".to_string());
        }
        let origin = origin?;
        self.origins
            .iter()
            .any(|o| o == origin)
            .then(|| origin.to_string())
    }

    /// Add CORS headers to a normal response
    pub fn apply(&self, origin: Option<&str>, response: &mut Response<Full<Bytes>>) {
        let headers = response.headers_mut();
        if !self.allow_any {
            headers.append(VARY, HeaderValue::from_static("Origin"));
        }
        if let Some(value) = self
            .allow_origin(origin)
            .and_then(|v| HeaderValue::from_str(&v).ok())
        {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
    }

    /// Add CORS headers to a preflight response
    ///
    /// Requested headers are reflected back; methods are the route's own.
    pub fn apply_preflight(
        &self,
        origin: Option<&str>,
        requested_headers: Option<&str>,
        allow_methods: &str,
        response: &mut Response<Full<Bytes>>,
    ) {
        self.apply(origin, response);
        if !response.headers().contains_key(ACCESS_CONTROL_ALLOW_ORIGIN) {
            return;
        }

        let headers = response.headers_mut();
        if let Ok(methods) = HeaderValue::from_str(allow_methods) {
            headers.insert(ACCESS_CONTROL_ALLOW_METHODS, methods);
        }
        let allow_headers = requested_headers
            .and_then(|h| HeaderValue::from_str(h).ok())
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_ALLOW_HEADERS));
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, allow_headers);
        headers.insert(
            ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(PREFLIGHT_MAX_AGE),
        );
    }
}
