/*
 * Responsibility
 * - GET /me
 * - 検証済みの identity をそのまま返す (wrap 対象外)
 */
use crate::api::v1::extractors::auth_ctx::AuthCtx;
use crate::security::VerifiedIdentity;

pub async fn me(AuthCtx(ctx): AuthCtx) -> VerifiedIdentity {
    ctx.principal().clone()
}
