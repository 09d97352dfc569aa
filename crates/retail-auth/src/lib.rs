//! Authentication and request gating for Retail Ops.
//!
//! - [`TokenIssuer`]: HS256 JWTs via `jsonwebtoken`
//! - [`hash_password`] / [`verify_password`]: argon2id PHC strings
//! - [`Claims`]: the token payload plus role and store permission checks
//! - [`RateLimiter`]: best-effort, in-memory fixed-window limiter keyed by
//!   client address

pub mod claims;
pub mod error;
pub mod jwt;
pub mod password;
pub mod rate_limit;

pub use claims::Claims;
pub use error::{AuthError, Result};
pub use jwt::{bearer_token, TokenIssuer, MAX_TOKEN_TTL, MIN_SECRET_LEN};
pub use password::{hash_password, verify_credentials, verify_password, MIN_PASSWORD_LEN};
pub use rate_limit::{Decision, RateLimiter};
