use axum::http::{HeaderMap, Uri};
use url::Url;

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Where a request is going, as far as the access guard cares.
///
/// Only the request path and, behind a trusted proxy, `X-Forwarded-Proto`
/// are read. `Host` and absolute-form request targets are caller-controlled
/// and never consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    path: String,
    secure: bool,
}

impl RequestTarget {
    /// `uri` should be the original request URI (before any `nest` stripped
    /// its prefix). The server itself speaks plain http, so the transport is
    /// secure only when a trusted proxy says so.
    pub fn from_parts(uri: &Uri, headers: &HeaderMap, trust_forwarded_proto: bool) -> Self {
        let secure = trust_forwarded_proto
            && headers
                .get(X_FORWARDED_PROTO)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("https"));

        Self {
            path: uri.path().to_string(),
            secure,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }
}

/// Requests that bypass the access guard entirely: API introspection
/// documents and calls addressed to the auth-check endpoint itself.
///
/// Both are resolved from configuration into plain path prefixes when the
/// guard is built; matching looks at the request path only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExemptPaths {
    introspection_prefix: String,
    auth_check_path: Option<String>,
}

impl ExemptPaths {
    /// The auth-check endpoint is exempt only when it lives under
    /// `public_base_url` (same scheme, host, port and path prefix), i.e. this
    /// service serves it. An endpoint at the root of the service would exempt
    /// every route and is refused.
    pub fn new(
        introspection_prefix: impl Into<String>,
        auth_check_endpoint: &Url,
        public_base_url: Option<&Url>,
    ) -> Self {
        Self {
            introspection_prefix: introspection_prefix.into(),
            auth_check_path: public_base_url
                .and_then(|base| served_path(auth_check_endpoint, base)),
        }
    }

    pub fn is_introspection(&self, path: &str) -> bool {
        path.starts_with(&self.introspection_prefix)
    }

    pub fn is_auth_check(&self, path: &str) -> bool {
        self.auth_check_path.as_deref().is_some_and(|prefix| {
            path.strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }

    pub fn matches(&self, target: &RequestTarget) -> bool {
        self.is_introspection(target.path()) || self.is_auth_check(target.path())
    }
}

fn served_path(endpoint: &Url, base: &Url) -> Option<String> {
    if endpoint.origin() != base.origin() {
        return None;
    }

    let base_path = base.path().trim_end_matches('/');
    let path = endpoint.path().trim_end_matches('/');

    let under_base = path
        .strip_prefix(base_path)
        .is_some_and(|rest| rest.starts_with('/'));

    if !under_base {
        tracing::warn!(
            endpoint = %endpoint,
            "auth-check endpoint is not a sub-path of the public base URL; no exemption"
        );
        return None;
    }

    Some(path.to_string())
}
