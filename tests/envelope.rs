#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Failure envelopes and success-body wrapping through the full stack.

mod common;

use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use chrono::DateTime;
use serde_json::json;

use common::{
    app, app_with, app_with_config, body_bytes, body_json, config_with, content_type,
    get as get_req, post_json, request,
};
use rest_guard::error::AppError;
use rest_guard::response::{Streamed, TokenPayload};

const USER: Option<&str> = Some("Bearer USER u1");

#[tokio::test]
async fn invalid_body_is_a_client_error_with_field_detail() {
    let res = app()
        .send(post_json("/api/v1/echo", USER, json!({"message": "", "repeat": 11})))
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(res).await,
        json!({
            "error": "body.message must be between 1 and 280 characters\n\
                      body.repeat must be between 1 and 10\n"
        })
    );
}

#[tokio::test]
async fn invalid_query_is_a_client_error() {
    let app = app();

    let res = app.send(get_req("/api/v1/echo?message=", USER)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(res).await,
        json!({"error": "query.message must not be blank\n"})
    );

    let res = app.send(get_req("/api/v1/echo", USER)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to deserialize query string")
    );
}

#[tokio::test]
async fn invalid_return_value_is_a_server_error() {
    let res = app()
        .send(post_json(
            "/api/v1/echo",
            USER,
            json!({"message": "x".repeat(100), "repeat": 3}),
        ))
        .await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(res).await,
        json!({"error": "echo.<return value>.message must be at most 280 characters\n"})
    );
}

#[tokio::test]
async fn valid_echo_round_trips() {
    let res = app()
        .send(post_json("/api/v1/echo", USER, json!({"message": "hi", "repeat": 2})))
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, json!({"message": "hihi", "from": "u1"}));
}

#[tokio::test]
async fn unreadable_body_keeps_the_framework_status() {
    let app = app();

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/echo")
        .header(header::AUTHORIZATION, "Bearer USER u1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.send(req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(content_type(&res), Some("application/json"));
    assert!(body_json(res).await["error"].is_string());

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/echo")
        .header(header::AUTHORIZATION, "Bearer USER u1")
        .body(Body::from("message=hi"))
        .unwrap();
    let res = app.send(req).await;
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body_json(res).await["error"].is_string());
}

#[tokio::test]
async fn unmatched_route_gets_an_envelope() {
    let res = app().send(get_req("/api/v1/nowhere", None)).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(content_type(&res), Some("application/json"));
    assert_eq!(body_json(res).await, json!({"error": "Not Found"}));
}

#[tokio::test]
async fn wrong_method_keeps_status_and_allow_header() {
    let res = app()
        .send(request(Method::DELETE, "/api/v1/health", None))
        .await;

    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(res.headers().contains_key(header::ALLOW));
    assert_eq!(body_json(res).await, json!({"error": "Method Not Allowed"}));
}

#[tokio::test]
async fn oversized_body_is_rejected_with_an_envelope() {
    let app = app_with_config(config_with(&[("BODY_LIMIT_BYTES", "64")]), |_| {
        Router::new().route("/upload", axum::routing::post(|body: String| async move { body }))
    });

    let req = Request::builder()
        .method(Method::POST)
        .uri("/upload")
        .body(Body::from("x".repeat(1024)))
        .unwrap();
    let res = app.send(req).await;

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body_json(res).await["error"].is_string());
}

#[tokio::test]
async fn slow_handler_times_out_with_an_envelope() {
    let app = app_with_config(config_with(&[("REQUEST_TIMEOUT_SECONDS", "1")]), |_| {
        Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                "done"
            }),
        )
    });

    let res = app.send(get_req("/slow", None)).await;

    assert_eq!(res.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body_json(res).await, json!({"error": "Request Timeout"}));
}

async fn boom() -> &'static str {
    panic!("secret detail")
}

#[tokio::test]
async fn handler_panic_is_a_generic_server_error() {
    let app = app_with(|_| {
        Router::new().route("/boom", get(boom))
    });

    let res = app.send(get_req("/boom", None)).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(res).await, json!({"error": "Internal error"}));
}

#[tokio::test]
async fn unclassified_faults_do_not_leak_detail() {
    let app = app_with(|_| {
        Router::new()
            .route(
                "/fault",
                get(|| async {
                    Err::<String, AppError>(anyhow::anyhow!("db password=hunter2").into())
                }),
            )
            .route(
                "/raw-500",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "stack trace here") }),
            )
    });

    for uri in ["/fault", "/raw-500"] {
        let res = app.send(get_req(uri, None)).await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body_json(res).await, json!({"error": "Internal error"}));
    }
}

#[tokio::test]
async fn plain_client_errors_keep_their_message() {
    let app = app_with(|_| {
        Router::new().route(
            "/conflict",
            get(|| async { (StatusCode::CONFLICT, "already exists") }),
        )
    });

    let res = app.send(get_req("/conflict", None)).await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(res).await, json!({"error": "already exists"}));
}

#[tokio::test]
async fn plain_text_is_wrapped_as_a_json_string() {
    let text = "line one\n\"quoted\" \u{e9}";
    let app = app_with(move |_| Router::new().route("/text", get(move || async move { text })));

    let res = app.send(get_req("/text", None)).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(content_type(&res), Some("application/json"));
    let decoded: String = serde_json::from_slice(&body_bytes(res).await).unwrap();
    assert_eq!(decoded, text);
}

#[tokio::test]
async fn json_bodies_are_left_alone() {
    let app = app_with(|_| {
        Router::new().route("/json", get(|| async { Json(json!({"a": [1, 2]})) }))
    });

    let res = app.send(get_req("/json", None)).await;

    assert_eq!(body_json(res).await, json!({"a": [1, 2]}));
}

#[tokio::test]
async fn exempt_payloads_pass_through() {
    let app = app_with(|_| {
        Router::new()
            .route(
                "/token",
                get(|| async {
                    TokenPayload {
                        access: "a".into(),
                        refresh: "r".into(),
                        expiration_date: DateTime::from_timestamp_millis(1_700_000_000_000)
                            .unwrap(),
                    }
                }),
            )
            .route(
                "/stream",
                get(|| async { Streamed::new("raw bytes").with_content_type("text/plain") }),
            )
            .route(
                "/events",
                get(|| async {
                    ([(header::CONTENT_TYPE, "text/event-stream")], "data: 1\n\n")
                }),
            )
            .route(
                "/challenge",
                get(|| async { ([(header::WWW_AUTHENTICATE, "Bearer")], "sign in") }),
            )
            .route(
                "/binary",
                get(|| async { vec![0xff_u8, 0xfe, 0x00] }),
            )
            .route("/empty", get(|| async { StatusCode::NO_CONTENT }))
    });

    let res = app.send(get_req("/token", None)).await;
    assert_eq!(
        body_json(res).await,
        json!({"access": "a", "refresh": "r", "expirationDate": 1_700_000_000_000_i64})
    );

    let res = app.send(get_req("/stream", None)).await;
    assert_eq!(content_type(&res), Some("text/plain"));
    assert_eq!(body_bytes(res).await, "raw bytes");

    let res = app.send(get_req("/events", None)).await;
    assert_eq!(body_bytes(res).await, "data: 1\n\n");

    let res = app.send(get_req("/challenge", None)).await;
    assert_eq!(body_bytes(res).await, "sign in");

    let res = app.send(get_req("/binary", None)).await;
    assert_eq!(&body_bytes(res).await[..], &[0xff_u8, 0xfe, 0x00]);

    let res = app.send(get_req("/empty", None)).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(res).await.is_empty());
}

#[tokio::test]
async fn identity_is_returned_unwrapped() {
    let res = app().send(get_req("/api/v1/me", Some("Bearer ADMIN root"))).await;

    assert_eq!(
        body_json(res).await,
        json!({"id": "root", "email": "test@email.com", "role": "ADMIN", "name": "name"})
    );
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let res = app().send(get_req("/api/v1/health", None)).await;

    assert!(res.headers().contains_key("x-request-id"));

    let res = app()
        .send(
            Request::builder()
                .uri("/api/v1/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(res.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn error_responses_are_json_even_for_not_found_resources() {
    let app = app_with(|_| {
        Router::new().route(
            "/missing",
            get(|| async { AppError::not_found("user").into_response() }),
        )
    });

    let res = app.send(get_req("/missing", None)).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(res).await, json!({"error": "user not found"}));
}

#[tokio::test]
async fn large_bodies_stream_through_unwrapped() {
    const NINE_MIB: usize = 9 * 1024 * 1024;

    let app = app_with(|_| {
        Router::new()
            .route(
                "/download",
                get(|| async {
                    (
                        [(header::CONTENT_TYPE, "application/octet-stream")],
                        vec![0xab_u8; NINE_MIB],
                    )
                }),
            )
            .route("/report", get(|| async { "a".repeat(NINE_MIB) }))
    });

    let res = app.send(get_req("/download", None)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(content_type(&res), Some("application/octet-stream"));
    let body = body_bytes(res).await;
    assert_eq!(body.len(), NINE_MIB);
    assert!(body.iter().all(|b| *b == 0xab));

    let res = app.send(get_req("/report", None)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(content_type(&res), Some("text/plain; charset=utf-8"));
    assert_eq!(body_bytes(res).await.len(), NINE_MIB);
}

#[tokio::test]
async fn typed_non_text_bodies_are_not_wrapped() {
    let app = app_with(|_| {
        Router::new().route(
            "/page",
            get(|| async { ([(header::CONTENT_TYPE, "application/xml")], "<a/>") }),
        )
    });

    let res = app.send(get_req("/page", None)).await;

    assert_eq!(content_type(&res), Some("application/xml"));
    assert_eq!(body_bytes(res).await, "<a/>");
}

#[tokio::test]
async fn handler_json_errors_are_enveloped() {
    let app = app_with(|_| {
        Router::new()
            .route(
                "/leaky",
                get(|| async {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"detail": "db password=hunter2"})),
                    )
                }),
            )
            .route(
                "/unprocessable",
                get(|| async {
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        Json(json!({"errors": [{"field": "name"}]})),
                    )
                }),
            )
            .route(
                "/taken",
                get(|| async { (StatusCode::CONFLICT, Json(json!({"error": "name taken"}))) }),
            )
    });

    let res = app.send(get_req("/leaky", None)).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(res).await, json!({"error": "Internal error"}));

    let res = app.send(get_req("/unprocessable", None)).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(res).await, json!({"error": "Unprocessable Entity"}));

    let res = app.send(get_req("/taken", None)).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(res).await, json!({"error": "name taken"}));
}
