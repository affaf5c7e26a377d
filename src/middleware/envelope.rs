//! Failure → error envelope.
//!
//! Two layers:
//! - `catch_panics` sits right outside the routes and turns a panicking
//!   handler into a plain 500 `{"error": "Internal error"}`.
//! - `apply` sits outside the HTTP plumbing and rewrites every error response
//!   that is not already an envelope (framework 404/405, extractor rejections,
//!   408, 413, handler-built JSON...). The status and headers are kept; the
//!   body becomes the envelope carrying the original text message, or the
//!   reason phrase when there was none or the body was some other JSON shape.
//!   Only `PassThrough` responses keep their error body as is.

use std::any::Any;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::{AppError, ErrorEnvelope, INTERNAL_ERROR_MESSAGE};
use crate::response::{is_json, is_pass_through};

// Framework error bodies are short; anything longer is not worth echoing.
const MAX_ERROR_BODY_BYTES: usize = 16 * 1024;

pub fn catch_panics(router: Router) -> Router {
    router.layer(CatchPanicLayer::custom(handle_panic))
}

pub fn apply(router: Router) -> Router {
    router.layer(middleware::from_fn(normalize_errors))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "non-string panic payload"
    };

    tracing::error!(panic = detail, "handler panicked");

    AppError::Internal.into_response()
}

async fn normalize_errors(req: Request<Body>, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    if !(status.is_client_error() || status.is_server_error()) || is_pass_through(&res) {
        return res;
    }

    let json = is_json(res.headers());
    let (parts, body) = res.into_parts();
    let bytes = to_bytes(body, MAX_ERROR_BODY_BYTES).await.ok();

    if json {
        if let Some(bytes) = bytes.as_ref().filter(|b| is_envelope(b)) {
            return Response::from_parts(parts, Body::from(bytes.clone()));
        }
    }

    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        INTERNAL_ERROR_MESSAGE.to_string()
    } else if status.is_server_error() || json {
        reason(status)
    } else {
        match bytes {
            Some(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => {
                String::from_utf8_lossy(&bytes).trim().to_string()
            }
            _ => reason(status),
        }
    };

    tracing::debug!(status = %status, message = %message, "wrapping error response");

    let mut normalized = (status, ErrorEnvelope::new(message)).into_response();

    for (name, value) in parts.headers.iter() {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            normalized.headers_mut().append(name.clone(), value.clone());
        }
    }

    normalized
}

/// `{"error": "<string>"}` and nothing else.
fn is_envelope(bytes: &[u8]) -> bool {
    serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(bytes)
        .is_ok_and(|map| map.len() == 1 && map.get("error").is_some_and(|v| v.is_string()))
}

fn reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Error").to_string()
}
