//! CORS policy for browser clients.
//!
//! Policy (permissive, credentials allowed):
//! - Every response: `Access-Control-Allow-Origin` echoes the request `Origin`
//!   (or `*` without one) and `Access-Control-Expose-Headers` lists the auth headers.
//! - `OPTIONS`: answered here with 204 and the full preflight header set. The
//!   request never reaches routing or the access guard, so preflight needs no
//!   credential.
//!
//! This layer must be the outermost one.

use axum::{
    Router,
    body::Body,
    http::{
        HeaderValue, Method, Request, StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
            ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE, ORIGIN,
        },
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tower_http::set_header::SetResponseHeaderLayer;

pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS, HEAD";
pub const ALLOWED_HEADERS: &str = "Origin, Content-Type, Accept, Authorization, WWW-Authenticate";
pub const EXPOSED_HEADERS: &str = "WWW-Authenticate, Authorization";
// Two weeks, in seconds.
pub const MAX_AGE_SECONDS: &str = "1209600";

/// Apply the CORS policy to the given Router.
pub fn apply(router: Router) -> Router {
    router
        .layer(middleware::from_fn(cors_middleware))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static(EXPOSED_HEADERS),
        ))
}

async fn cors_middleware(req: Request<Body>, next: Next) -> Response {
    let allow_origin = req
        .headers()
        .get(ORIGIN)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("*"));

    if req.method() == Method::OPTIONS {
        let mut res = StatusCode::NO_CONTENT.into_response();
        let headers = res.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECONDS));
        return res;
    }

    let mut res = next.run(req).await;
    res.headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    res
}
