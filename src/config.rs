/*
 * Responsibility
 * - 環境変数や設定の読み込み (AUTH_CHECK_ENDPOINT, timeouts, cache など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use url::Url;

/// Longest TTL accepted for cached verifications. Revocation at the identity
/// provider has to become visible within this window.
pub const MAX_VERIFY_CACHE_TTL_SECONDS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // Identity service. `/check` is appended when calling it.
    pub auth_check_endpoint: Url,
    pub auth_check_timeout: Duration,

    pub introspection_path_prefix: String,

    // Externally visible base URL of this service. The auth-check endpoint is
    // exempt from the guard only when it lives under it.
    pub public_base_url: Option<Url>,
    // Set only when a proxy that overwrites X-Forwarded-Proto fronts the service.
    pub trust_forwarded_proto: bool,

    // Verification cache (disabled unless a URL is given)
    pub verify_cache_url: Option<String>,
    pub verify_cache_ttl_seconds: u64,

    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// `from_env` is a thin wrapper over this; tests feed a map instead of
    /// mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host: IpAddr = match lookup("HOST") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("HOST"))?,
            None => IpAddr::from([0, 0, 0, 0]),
        };

        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8080,
        };

        let addr = SocketAddr::new(host, port);

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let raw_endpoint = lookup("AUTH_CHECK_ENDPOINT")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("AUTH_CHECK_ENDPOINT"))?;

        let auth_check_endpoint =
            Url::parse(&raw_endpoint).map_err(|_| ConfigError::Invalid("AUTH_CHECK_ENDPOINT"))?;

        if !matches!(auth_check_endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid("AUTH_CHECK_ENDPOINT"));
        }

        let auth_check_timeout = Duration::from_millis(parse_or(
            &lookup,
            "AUTH_CHECK_TIMEOUT_MS",
            5_000,
        )?);

        if auth_check_timeout.is_zero() {
            return Err(ConfigError::Invalid("AUTH_CHECK_TIMEOUT_MS"));
        }

        let introspection_path_prefix = lookup("INTROSPECTION_PATH_PREFIX")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "/openapi.".to_string());

        let public_base_url = match lookup("PUBLIC_BASE_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
        {
            Some(raw) => {
                let url = Url::parse(&raw).map_err(|_| ConfigError::Invalid("PUBLIC_BASE_URL"))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(ConfigError::Invalid("PUBLIC_BASE_URL"));
                }
                Some(url)
            }
            None => None,
        };

        let trust_forwarded_proto = parse_or(&lookup, "TRUST_FORWARDED_PROTO", false)?;

        let verify_cache_url = lookup("VERIFY_CACHE_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let verify_cache_ttl_seconds = parse_or(&lookup, "VERIFY_CACHE_TTL_SECONDS", 30)?;

        if verify_cache_ttl_seconds == 0 || verify_cache_ttl_seconds > MAX_VERIFY_CACHE_TTL_SECONDS
        {
            return Err(ConfigError::Invalid("VERIFY_CACHE_TTL_SECONDS"));
        }

        let request_timeout =
            Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECONDS", 30)?);

        let body_limit_bytes = parse_or(&lookup, "BODY_LIMIT_BYTES", 1024 * 1024)?;

        Ok(Self {
            addr,
            app_env,
            auth_check_endpoint,
            auth_check_timeout,
            introspection_path_prefix,
            public_base_url,
            trust_forwarded_proto,
            verify_cache_url,
            verify_cache_ttl_seconds,
            request_timeout,
            body_limit_bytes,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
