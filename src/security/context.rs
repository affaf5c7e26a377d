use super::identity::{Role, VerifiedIdentity};

/// Binding of a verified identity to the current request.
///
/// Only the access guard creates one, after an allow decision, and stores it
/// in the request extensions. Handlers read it through `AuthCtx`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityContext {
    principal: VerifiedIdentity,
    secure: bool,
}

impl SecurityContext {
    pub const AUTHENTICATION_SCHEME: &'static str = "Bearer";

    pub(crate) fn bearer(principal: VerifiedIdentity, secure: bool) -> Self {
        Self { principal, secure }
    }

    pub fn principal(&self) -> &VerifiedIdentity {
        &self.principal
    }

    /// Whether the request arrived over https.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn authentication_scheme(&self) -> &'static str {
        Self::AUTHENTICATION_SCHEME
    }

    pub fn is_user_in_role(&self, role: &str) -> bool {
        self.principal.role().as_str().eq_ignore_ascii_case(role)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.principal.role() == role
    }
}
