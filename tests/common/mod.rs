#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{Method, Request, Response, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use rest_guard::{
    app::build_router,
    config::Config,
    middleware,
    security::VerifiedIdentity,
    services::identity::{IdentityVerifier, VerificationError},
    state::AppState,
};

pub const AUTH_CHECK_ENDPOINT: &str = "http://auth.local/api/v1/auth";

/// Identity service double: a `"<ROLE> <id>"` token is valid, anything else
/// is rejected with 401.
#[derive(Default)]
pub struct FakeVerifier {
    calls: AtomicUsize,
}

impl FakeVerifier {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityVerifier for FakeVerifier {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn verify(&self, bearer: &str) -> Result<VerifiedIdentity, VerificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let (role, id) = bearer
            .split_once(' ')
            .ok_or(VerificationError::Rejected(401))?;

        serde_json::from_value(json!({
            "id": id,
            "email": "test@email.com",
            "role": role,
            "name": "name"
        }))
        .map_err(|_| VerificationError::Rejected(401))
    }
}

pub fn config() -> Config {
    Config::from_lookup(|key| match key {
        "AUTH_CHECK_ENDPOINT" => Some(AUTH_CHECK_ENDPOINT.to_string()),
        "AUTH_CHECK_TIMEOUT_MS" => Some("1000".to_string()),
        _ => None,
    })
    .unwrap()
}

pub struct TestApp {
    pub router: Router,
    pub verifier: Arc<FakeVerifier>,
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }
}

/// The demo application exactly as the binary serves it.
pub fn app() -> TestApp {
    let config = config();
    let verifier = Arc::new(FakeVerifier::default());
    let state = AppState::from_config(&config, verifier.clone());

    TestApp {
        router: build_router(state, &config),
        verifier,
    }
}

/// Custom routes behind the full middleware stack.
pub fn app_with<F>(routes: F) -> TestApp
where
    F: FnOnce(&AppState) -> Router<AppState>,
{
    app_with_config(config(), routes)
}

pub fn app_with_config<F>(config: Config, routes: F) -> TestApp
where
    F: FnOnce(&AppState) -> Router<AppState>,
{
    let verifier = Arc::new(FakeVerifier::default());
    let state = AppState::from_config(&config, verifier.clone());

    let router = routes(&state).with_state(state.clone());

    TestApp {
        router: middleware::apply(router, &state, &config),
        verifier,
    }
}

/// `config()` with some keys overridden.
pub fn config_with(overrides: &[(&'static str, &'static str)]) -> Config {
    let overrides = overrides.to_vec();
    Config::from_lookup(move |key| {
        overrides
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
            .or_else(|| match key {
                "AUTH_CHECK_ENDPOINT" => Some(AUTH_CHECK_ENDPOINT.to_string()),
                _ => None,
            })
    })
    .unwrap()
}

pub fn request(method: Method, uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    request(Method::GET, uri, authorization)
}

pub fn post_json(uri: &str, authorization: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_bytes(res: Response<Body>) -> Bytes {
    res.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(res: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(res).await).unwrap()
}

pub fn content_type(res: &Response<Body>) -> Option<&str> {
    res.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
}
