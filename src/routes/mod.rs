//! HTTP routes for Karmicup
//!
//! Handlers take the already-collected request body so they can be driven
//! directly in tests. Every response is JSON; failures use `{ "error": ... }`.

pub mod account;
pub mod health;
pub mod submissions;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::types::KarmaError;

pub use account::{handle_link_reddit, handle_me};
pub use health::{handle_health, handle_version};
pub use submissions::{
    handle_create_submission, handle_feed, handle_modify_submission, handle_my_submissions,
    handle_verify_submission,
};

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Bodies above this size are rejected before parsing
pub const MAX_BODY_BYTES: usize = 10 * 1024;

pub fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

fn with_cors(response: &mut Response<BoxBody>) {
    let headers = response.headers_mut();
    headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET, POST, PATCH, OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type, Authorization"),
    );
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    let mut response = Response::new(full_body(json));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    with_cors(&mut response);
    response
}

/// Map an error to its status and `{ "error": ... }` body.
/// Internal failures are logged here with full detail.
pub fn error_response(err: KarmaError) -> Response<BoxBody> {
    if err.is_internal() {
        error!(error = %err, "Request failed");
    }
    let (status, message) = err.into_status_code_and_body();
    json_response(status, &json!({ "error": message }))
}

pub fn not_found_response(path: &str) -> Response<BoxBody> {
    json_response(
        StatusCode::NOT_FOUND,
        &json!({ "error": format!("No route for {}", path) }),
    )
}

pub fn cors_preflight() -> Response<BoxBody> {
    let mut response = Response::new(full_body(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    with_cors(&mut response);
    response
        .headers_mut()
        .insert("Access-Control-Max-Age", HeaderValue::from_static("86400"));
    response
}

/// Decode a JSON body. An empty body decodes as `{}`.
pub fn parse_json_body<T: for<'de> Deserialize<'de>>(body: &Bytes) -> Result<T, KarmaError> {
    if body.len() > MAX_BODY_BYTES {
        return Err(KarmaError::Validation("Request body too large".into()));
    }
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return serde_json::from_str("{}")
            .map_err(|_| KarmaError::Validation("Request body is required".into()));
    }
    serde_json::from_slice(body).map_err(|e| KarmaError::Validation(format!("Invalid request body: {}", e)))
}
