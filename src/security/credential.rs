//! `Authorization` header parsing.
//!
//! The header is split on its first space: the left token names the scheme
//! (case-insensitive), the remainder is kept verbatim as the parameter.
//! A header without a separator carries no usable parameter and is treated
//! exactly like a missing header.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheme {
    None,
    Bearer,
    Basic,
    Digest,
    /// A scheme token outside the known set. Kept so the guard can reject it
    /// explicitly instead of guessing.
    Other(String),
}

impl Scheme {
    fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("bearer") {
            Self::Bearer
        } else if token.eq_ignore_ascii_case("basic") {
            Self::Basic
        } else if token.eq_ignore_ascii_case("digest") {
            Self::Digest
        } else {
            Self::Other(token.to_string())
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::None => f.write_str("none"),
            Scheme::Bearer => f.write_str("bearer"),
            Scheme::Basic => f.write_str("basic"),
            Scheme::Digest => f.write_str("digest"),
            Scheme::Other(token) => write!(f, "other({token})"),
        }
    }
}

/// Credential presented with a request.
///
/// Invariant: `scheme == Scheme::None` iff `parameter` is `None`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    scheme: Scheme,
    parameter: Option<String>,
}

impl Credential {
    const NONE: Credential = Credential {
        scheme: Scheme::None,
        parameter: None,
    };

    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::NONE;
        };

        if raw.trim().is_empty() {
            return Self::NONE;
        }

        let Some((scheme, parameter)) = raw.split_once(' ') else {
            return Self::NONE;
        };

        Self {
            scheme: Scheme::from_token(scheme),
            parameter: Some(parameter.to_string()),
        }
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    pub fn is_none(&self) -> bool {
        self.scheme == Scheme::None
    }

    /// The bearer parameter, if this is a bearer credential.
    pub fn bearer(&self) -> Option<&str> {
        match self.scheme {
            Scheme::Bearer => self.parameter.as_deref(),
            _ => None,
        }
    }
}

// Never print the parameter, it is a secret.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("scheme", &self.scheme)
            .field("parameter", &self.parameter.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
