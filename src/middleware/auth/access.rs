//! Access guard: declared policy → credential → remote verification → role check.
//!
//! The guard is attached per route (or per router) with `route_layer`, so it
//! only runs for requests that matched a route. The route's policy is
//! classified once, when the guard is attached; routes without a declared
//! policy get no guard at all.
//!
//! On allow, the `SecurityContext` is inserted into the request extensions
//! for handlers to pick up through `AuthCtx`.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::error::AppError;
use crate::security::{
    Decision, PolicyDescriptor, RequestTarget, SecurityRequirement, authorize, classify,
};
use crate::state::AppState;

#[derive(Clone)]
struct Guard {
    state: AppState,
    requirement: Arc<SecurityRequirement>,
}

/// Guard a single route with `policy`.
///
/// ```ignore
/// Router::new().route(
///     "/me",
///     access::require(get(me), &state, PolicyDescriptor::permit_all()),
/// )
/// ```
pub fn require(
    route: MethodRouter<AppState>,
    state: &AppState,
    policy: PolicyDescriptor,
) -> MethodRouter<AppState> {
    match guard(state, &policy) {
        Some(guard) => route.route_layer(middleware::from_fn_with_state(guard, access_middleware)),
        None => route,
    }
}

/// Guard every route of `router` with the same `policy`.
pub fn apply(
    router: Router<AppState>,
    state: &AppState,
    policy: PolicyDescriptor,
) -> Router<AppState> {
    match guard(state, &policy) {
        Some(guard) => {
            router.route_layer(middleware::from_fn_with_state(guard, access_middleware))
        }
        None => router,
    }
}

fn guard(state: &AppState, policy: &PolicyDescriptor) -> Option<Guard> {
    let Some(requirement) = classify(policy) else {
        // Default-open: an operation without a policy is reachable by anyone.
        tracing::debug!("no access policy declared; route stays open");
        return None;
    };

    Some(Guard {
        state: state.clone(),
        requirement: Arc::new(requirement),
    })
}

async fn access_middleware(
    State(guard): State<Guard>,
    // `nest` strips its prefix from the request URI; exemptions work on the full path.
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let target = RequestTarget::from_parts(
        &original_uri,
        req.headers(),
        guard.state.access.trust_forwarded_proto,
    );

    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let decision = authorize(
        &guard.state.access,
        Some(guard.requirement.as_ref()),
        &target,
        authorization,
        &guard.state.verifier,
    )
    .await;

    match decision {
        Decision::Skip => Ok(next.run(req).await),
        Decision::Allow(ctx) => {
            tracing::debug!(
                user_id = ctx.principal().id(),
                role = %ctx.principal().role(),
                "access granted"
            );

            // middleware → extractor への受け渡し
            req.extensions_mut().insert(ctx);

            Ok(next.run(req).await)
        }
        Decision::Unauthorized => {
            tracing::warn!(path = target.path(), "no credential presented");
            Err(AppError::Unauthorized)
        }
        Decision::Forbid(denial) => {
            tracing::warn!(path = target.path(), reason = %denial, "access denied");
            Err(AppError::Forbidden)
        }
    }
}
