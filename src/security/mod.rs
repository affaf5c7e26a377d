//! Authorization pipeline building blocks.
//!
//! Everything here is request-local: values are built fresh for each
//! evaluation and never shared between requests.

pub mod context;
pub mod credential;
pub mod decision;
pub mod identity;
pub mod requirement;
pub mod target;

pub use context::SecurityContext;
pub use credential::{Credential, Scheme};
pub use decision::{AccessSettings, Decision, Denial, authorize};
pub use identity::{Role, VerifiedIdentity};
pub use requirement::{PolicyDescriptor, SecurityRequirement, classify};
pub use target::{ExemptPaths, RequestTarget};
