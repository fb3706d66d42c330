//! Ingestion endpoint
//!
//! `POST /api`: persists any non-empty JSON body as a stored record.

use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};
use serde_json::Value;
use std::fmt::Display;

use crate::config::AppState;
use crate::http::{self, INVALID_JSON_MESSAGE};
use crate::logger;

/// Handle an ingestion request
///
/// Only an unusable body is reported to the caller. A failed save is logged
/// and still answered with `{"status":"ok"}`.
pub async fn handle_ingest<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return http::error_response(StatusCode::BAD_REQUEST, INVALID_JSON_MESSAGE);
        }
    };

    let Some(payload) = parse_payload(&body) else {
        return http::error_response(StatusCode::BAD_REQUEST, INVALID_JSON_MESSAGE);
    };

    match state.store.save(payload).await {
        Ok(path) => logger::log_record_saved(&path),
        Err(e) => logger::log_save_failed(&e),
    }

    http::ok_response()
}

/// Parse a request body, `None` when it is not JSON or is an empty value
pub fn parse_payload(body: &[u8]) -> Option<Value> {
    let value: Value = serde_json::from_slice(body).ok()?;
    (!is_empty_value(&value)).then_some(value)
}

/// `null`, `false`, zero, `""`, `[]` and `{}` count as no data
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
