//! Auth error types.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No bearer token on the request.
    #[error("missing bearer token")]
    MissingToken,

    /// Signature, algorithm or payload check failed.
    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    Expired,

    /// Authenticated, but not allowed to do this.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The signing secret is too short to be safe.
    #[error("jwt secret must be at least {0} bytes")]
    WeakSecret(usize),

    /// Token lifetime outside `1s..=MAX_TOKEN_TTL`.
    #[error("token ttl must be between 1 second and {0} days")]
    InvalidTtl(u64),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
