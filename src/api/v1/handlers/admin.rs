/*
 * Responsibility
 * - /admin 配下 (ADMIN ロールのみ)
 * - plain text を返し、wrap middleware で JSON 文字列になる
 */
use crate::api::v1::extractors::auth_ctx::AuthCtx;

pub async fn ping(AuthCtx(ctx): AuthCtx) -> String {
    format!("pong {}", ctx.principal().id())
}
