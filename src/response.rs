//! Response payloads that bypass JSON wrapping.
//!
//! A response carrying the `PassThrough` extension is sent exactly as its
//! handler produced it. Identity payloads, token payloads, error envelopes
//! and streamed bodies set it.

use axum::{
    Json,
    body::Body,
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response extension: skip the response wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassThrough;

pub(crate) fn is_pass_through(res: &Response) -> bool {
    res.extensions().get::<PassThrough>().is_some()
}

/// Access/refresh token pair as handed out by an authentication endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub access: String,
    pub refresh: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expiration_date: DateTime<Utc>,
}

impl IntoResponse for TokenPayload {
    fn into_response(self) -> Response {
        let mut res = Json(self).into_response();
        res.extensions_mut().insert(PassThrough);
        res
    }
}

/// Raw streamed output.
pub struct Streamed {
    body: Body,
    content_type: HeaderValue,
}

impl Streamed {
    pub fn new(body: impl Into<Body>) -> Self {
        Self {
            body: body.into(),
            content_type: HeaderValue::from_static("application/octet-stream"),
        }
    }

    pub fn with_content_type(mut self, content_type: &'static str) -> Self {
        self.content_type = HeaderValue::from_static(content_type);
        self
    }
}

impl IntoResponse for Streamed {
    fn into_response(self) -> Response {
        let mut res = Response::new(self.body);
        res.headers_mut()
            .insert(header::CONTENT_TYPE, self.content_type);
        res.extensions_mut().insert(PassThrough);
        res
    }
}

pub(crate) fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|media| {
            let media = media.trim().to_ascii_lowercase();
            media == "application/json" || media.ends_with("+json")
        })
        .unwrap_or(false)
}
