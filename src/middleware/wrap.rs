//! Uniform JSON for successful responses.
//!
//! A 2xx response is re-serialized as JSON unless:
//! - the request targeted an introspection path,
//! - the response carries `Authorization` or `WWW-Authenticate` (auth handshake),
//! - the payload is exempt (`PassThrough`: identity, token, error envelope, stream),
//! - the declared content type is anything but `text/*` (JSON, binary, ...),
//! - the body is a `text/event-stream`, is empty, is not UTF-8, or has no
//!   known size within the buffering limit.
//!
//! The decision is made from the headers first, so only untyped or `text/*`
//! bodies are ever buffered; everything else streams through untouched.
//! What is left is plain text, which becomes a JSON string. Reading it back
//! as JSON yields the original text.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, HttpBody, to_bytes},
    extract::State,
    http::{HeaderMap, HeaderValue, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::response::is_pass_through;
use crate::security::AccessSettings;

const MAX_WRAPPED_BODY_BYTES: usize = 8 * 1024 * 1024;

pub fn apply(router: Router, access: Arc<AccessSettings>) -> Router {
    router.layer(middleware::from_fn_with_state(access, wrap_entity))
}

async fn wrap_entity(
    State(access): State<Arc<AccessSettings>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let introspection = access.exempt.is_introspection(req.uri().path());

    let res = next.run(req).await;

    if introspection || !needs_wrapping(&res) {
        return Ok(res);
    }

    let fits = res
        .body()
        .size_hint()
        .upper()
        .is_some_and(|upper| upper <= MAX_WRAPPED_BODY_BYTES as u64);
    if !fits {
        tracing::debug!("text body too large or unsized; left unwrapped");
        return Ok(res);
    }

    let (mut parts, body) = res.into_parts();

    let bytes = to_bytes(body, MAX_WRAPPED_BODY_BYTES)
        .await
        .map_err(anyhow::Error::from)?;

    if bytes.is_empty() {
        return Ok(Response::from_parts(parts, Body::empty()));
    }

    let Ok(text) = std::str::from_utf8(&bytes) else {
        tracing::debug!("binary response body left unwrapped");
        return Ok(Response::from_parts(parts, Body::from(bytes)));
    };

    let json = serde_json::to_vec(text).map_err(anyhow::Error::from)?;

    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    parts.headers.remove(header::CONTENT_LENGTH);

    Ok(Response::from_parts(parts, Body::from(json)))
}

fn needs_wrapping(res: &Response) -> bool {
    let headers = res.headers();

    res.status().is_success()
        && !is_pass_through(res)
        && !headers.contains_key(header::AUTHORIZATION)
        && !headers.contains_key(header::WWW_AUTHENTICATE)
        && is_untyped_or_text(headers)
}

fn is_untyped_or_text(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return true;
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.split(';').next())
        .map(|media| media.trim().to_ascii_lowercase())
        .is_some_and(|media| media.starts_with("text/") && media != "text/event-stream")
}
