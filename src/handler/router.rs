//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route lookup, CORS and access logging.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{ACCESS_CONTROL_REQUEST_HEADERS, ORIGIN, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::handler::{ingest, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};

pub const INGEST_PATH: &str = "/api";
pub const SCRIPT_PATH: &str = "/main.js";

/// What a registered route does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Ingest,
    Script,
}

/// Result of looking up a method and path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMatch {
    Found(Endpoint),
    MethodNotAllowed,
    NotFound,
}

#[derive(Debug)]
struct Route {
    method: Method,
    path: &'static str,
    endpoint: Endpoint,
}

/// Method + path routing table, built once at startup
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
            .register(Method::POST, INGEST_PATH, Endpoint::Ingest)
            .register(Method::GET, SCRIPT_PATH, Endpoint::Script)
    }

    pub fn register(mut self, method: Method, path: &'static str, endpoint: Endpoint) -> Self {
        self.routes.push(Route {
            method,
            path,
            endpoint,
        });
        self
    }

    /// Find the endpoint for a request; `GET` routes also answer `HEAD`
    pub fn lookup(&self, method: &Method, path: &str) -> RouteMatch {
        let wanted = if method == Method::HEAD {
            &Method::GET
        } else {
            method
        };

        let mut path_known = false;
        for route in self.routes.iter().filter(|r| r.path == path) {
            if route.method == *wanted {
                return RouteMatch::Found(route.endpoint);
            }
            path_known = true;
        }

        if path_known {
            RouteMatch::MethodNotAllowed
        } else {
            RouteMatch::NotFound
        }
    }

    pub fn has_path(&self, path: &str) -> bool {
        self.routes.iter().any(|r| r.path == path)
    }

    /// `Allow` header value for a registered path
    pub fn allowed_methods(&self, path: &str) -> String {
        let mut methods = Vec::new();
        for route in self.routes.iter().filter(|r| r.path == path) {
            methods.push(route.method.as_str());
            if route.method == Method::GET {
                methods.push(Method::HEAD.as_str());
            }
        }
        methods.push(Method::OPTIONS.as_str());
        methods.join(", ")
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    let started = Instant::now();
    let mut entry = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&req, remote_addr));

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let origin = header_string(&req, ORIGIN);

    let response = if method == Method::OPTIONS && state.routes.has_path(&path) {
        let requested_headers = header_string(&req, ACCESS_CONTROL_REQUEST_HEADERS);
        let allow = state.routes.allowed_methods(&path);
        let mut response = http::build_options_response(&allow);
        state.cors.apply_preflight(
            origin.as_deref(),
            requested_headers.as_deref(),
            &allow,
            &mut response,
        );
        response
    } else {
        let mut response = dispatch(req, &state, &method, &path).await;
        state.cors.apply(origin.as_deref(), &mut response);
        response
    };

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_default();
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch to the endpoint registered for method and path
async fn dispatch<B>(
    req: Request<B>,
    state: &AppState,
    method: &Method,
    path: &str,
) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    match state.routes.lookup(method, path) {
        RouteMatch::Found(Endpoint::Ingest) => ingest::handle_ingest(req, state).await,
        RouteMatch::Found(Endpoint::Script) => {
            static_files::serve_script(&state.script_path, *method == Method::HEAD).await
        }
        RouteMatch::MethodNotAllowed => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            http::build_405_response(&state.routes.allowed_methods(path))
        }
        RouteMatch::NotFound => http::build_404_response(),
    }
}

fn header_string<B>(req: &Request<B>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn access_entry<B>(req: &Request<B>, remote_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
    .to_string();
    entry.referer = header_string(req, REFERER);
    entry.user_agent = header_string(req, USER_AGENT);
    entry
}
