//! Declared access policy of an operation and its classification.
//!
//! Routes declare a `PolicyDescriptor` when they are registered; it is
//! classified once, and the resulting `SecurityRequirement` travels with the
//! route's guard layer.

use std::collections::BTreeSet;

use super::identity::Role;

/// Policy metadata as declared on an operation. More than one marker may be
/// set; `classify` resolves them by priority.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyDescriptor {
    deny_all: bool,
    permit_all: bool,
    roles_allowed: Option<Vec<String>>,
}

impl PolicyDescriptor {
    /// No policy at all. The pipeline does not engage for such operations.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn deny_all() -> Self {
        Self::default().with_deny_all()
    }

    pub fn permit_all() -> Self {
        Self::default().with_permit_all()
    }

    pub fn roles_allowed<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().with_roles_allowed(roles)
    }

    pub fn with_deny_all(mut self) -> Self {
        self.deny_all = true;
        self
    }

    pub fn with_permit_all(mut self) -> Self {
        self.permit_all = true;
        self
    }

    pub fn with_roles_allowed<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles_allowed = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_declared(&self) -> bool {
        self.deny_all || self.permit_all || self.roles_allowed.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityRequirement {
    /// Any verified identity is accepted.
    Unrestricted,
    /// Nobody is accepted.
    Denied,
    /// A verified identity whose role is in the set.
    Restricted(BTreeSet<Role>),
}

impl SecurityRequirement {
    pub fn admits(&self, role: Role) -> bool {
        match self {
            SecurityRequirement::Unrestricted => true,
            SecurityRequirement::Denied => false,
            SecurityRequirement::Restricted(allowed) => allowed.contains(&role),
        }
    }
}

/// Resolve a declared policy. `None` means the operation declared nothing and
/// stays reachable without any identity check.
///
/// Priority: deny-all, then permit-all, then roles-allowed.
pub fn classify(policy: &PolicyDescriptor) -> Option<SecurityRequirement> {
    if policy.deny_all {
        return Some(SecurityRequirement::Denied);
    }

    if policy.permit_all {
        return Some(SecurityRequirement::Unrestricted);
    }

    let declared = policy.roles_allowed.as_ref()?;

    let mut allowed = BTreeSet::new();
    for name in declared {
        match name.parse::<Role>() {
            Ok(role) => {
                allowed.insert(role);
            }
            Err(err) => {
                tracing::warn!(error = %err, "ignoring undeclared role in route policy");
            }
        }
    }

    Some(SecurityRequirement::Restricted(allowed))
}
