//! Identity verification against the remote auth-check endpoint.
//!
//! Contract: `POST {endpoint}/check` with `Authorization: bearer <token>` and
//! an empty body. A 2xx answer carries `{id, email, role, name}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use url::Url;

use crate::security::identity::VerifiedIdentity;
use crate::services::identity::verifier::{IdentityVerifier, VerificationError};

#[derive(Debug, thiserror::Error)]
pub enum RemoteSetupError {
    #[error("invalid auth-check endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct RemoteIdentityVerifier {
    client: reqwest::Client,
    check_url: Url,
}

impl RemoteIdentityVerifier {
    pub fn new(endpoint: &Url, timeout: Duration) -> Result<Self, RemoteSetupError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self::with_client(client, endpoint)?)
    }

    /// Use a preconfigured client. The client is expected to carry its own timeout.
    pub fn with_client(client: reqwest::Client, endpoint: &Url) -> Result<Self, url::ParseError> {
        let check_url = Url::parse(&format!(
            "{}/check",
            endpoint.as_str().trim_end_matches('/')
        ))?;

        Ok(Self { client, check_url })
    }

    pub fn check_url(&self) -> &Url {
        &self.check_url
    }
}

#[async_trait]
impl IdentityVerifier for RemoteIdentityVerifier {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn verify(&self, bearer: &str) -> Result<VerifiedIdentity, VerificationError> {
        let res = self
            .client
            .post(self.check_url.clone())
            .header(header::AUTHORIZATION, format!("bearer {bearer}"))
            .send()
            .await
            .map_err(transport_error)?;

        let status = res.status();
        if !status.is_success() {
            return Err(VerificationError::Rejected(status.as_u16()));
        }

        let body = res.bytes().await.map_err(transport_error)?;

        // `null` parses to `None`; anything that is not an identity is malformed.
        let identity: Option<VerifiedIdentity> = serde_json::from_slice(&body)
            .map_err(|e| VerificationError::Malformed(e.to_string()))?;

        identity.ok_or(VerificationError::NoIdentity)
    }
}

fn transport_error(err: reqwest::Error) -> VerificationError {
    if err.is_timeout() {
        VerificationError::Timeout
    } else {
        VerificationError::Transport(err.to_string())
    }
}
