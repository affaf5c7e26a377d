/*
 * Responsibility
 * - GET/POST /echo
 * - 入力 (query/body) を validator で検証し、出力も返却前に検証する
 *   - 入力違反 → 400、出力違反 → 500
 */
use axum::Json;

use crate::api::v1::dto::echo::{EchoQuery, EchoRequest, EchoResponse};
use crate::api::v1::extractors::auth_ctx::AuthCtx;
use crate::api::v1::extractors::validated::{ValidatedJson, ValidatedQuery};
use crate::error::AppError;
use crate::validation::validate_output;

pub async fn echo(
    AuthCtx(ctx): AuthCtx,
    ValidatedJson(req): ValidatedJson<EchoRequest>,
) -> Result<Json<EchoResponse>, AppError> {
    let res = EchoResponse {
        message: req.message.repeat(usize::from(req.repeat)),
        from: ctx.principal().id().to_string(),
    };

    Ok(Json(validate_output("echo", res)?))
}

pub async fn echo_query(
    AuthCtx(ctx): AuthCtx,
    ValidatedQuery(query): ValidatedQuery<EchoQuery>,
) -> Result<Json<EchoResponse>, AppError> {
    let res = EchoResponse {
        message: query.message,
        from: ctx.principal().id().to_string(),
    };

    Ok(Json(validate_output("echo_query", res)?))
}
