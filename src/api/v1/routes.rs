/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 各 operation のアクセスポリシーをここで宣言する (access::require / access::apply)
 * - ポリシーを宣言しない route は誰でも到達できる
 */
use axum::{Router, routing::get};

use crate::middleware::auth::access;
use crate::security::{PolicyDescriptor, Role};
use crate::state::AppState;

use crate::api::v1::handlers::{admin::ping, echo::{echo, echo_query}, health::health, me::me};

pub fn routes(state: &AppState) -> Router<AppState> {
    let admin = access::apply(
        Router::new().route("/ping", get(ping)),
        state,
        PolicyDescriptor::roles_allowed([Role::Admin.as_str()]),
    );

    Router::new()
        .route("/health", get(health))
        .route(
            "/me",
            access::require(get(me), state, PolicyDescriptor::permit_all()),
        )
        .route(
            "/echo",
            access::require(get(echo_query).post(echo), state, PolicyDescriptor::permit_all()),
        )
        .nest("/admin", admin)
}
