/*
 * Responsibility
 * - middleware の公開インターフェース
 * - 全ルート共通の層をまとめて適用する (apply)
 */
use axum::Router;

use crate::config::Config;
use crate::state::AppState;

pub mod auth;
pub mod cors;
pub mod envelope;
pub mod http;
pub mod wrap;

/// Apply the shared stack to a fully routed Router.
///
/// Outermost first: CORS → error envelope → HTTP plumbing → panic capture →
/// response wrapping → routes (each carrying its own access guard).
pub fn apply(router: Router, state: &AppState, config: &Config) -> Router {
    let router = wrap::apply(router, state.access.clone());
    let router = envelope::catch_panics(router);
    let router = http::apply(router, config);
    let router = envelope::apply(router);
    cors::apply(router)
}
