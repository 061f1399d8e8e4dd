//! Session token issuance and credential hashing.
//!
//! The stores never see raw tokens: route middleware verifies the bearer
//! token through [`SessionIssuer::verify`] and hands handlers a
//! [`SessionUser`] extension carrying the trusted username.

pub mod password;
pub mod session;

pub use password::{hash_password, verify_password};
pub use session::{SessionClaims, SessionConfig, SessionError, SessionIssuer};

/// Verified username for the current request, inserted by the session
/// middleware and trusted by downstream handlers.
#[derive(Debug, Clone)]
pub struct SessionUser(pub String);
