/*
 * Responsibility
 * - GET /health (疎通確認)
 * - ポリシー未宣言 route の例: 資格情報なしで到達でき、SecurityContext も付かない
 */
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Health {
    status: &'static str,
    version: &'static str,
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
