pub mod cached;
pub mod factory;
pub mod remote;
pub mod verifier;

pub use cached::CachedIdentityVerifier;
pub use factory::build_identity_verifier;
pub use remote::RemoteIdentityVerifier;
pub use verifier::{IdentityVerifier, VerificationError};
