//! JWT issuing and verification.
//!
//! Tokens are standard compact JWTs (`header.payload.signature`, base64url)
//! signed with HMAC-SHA256.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::debug;

use retail_models::User;

use crate::claims::Claims;
use crate::error::{AuthError, Result};

/// Shortest accepted HMAC secret, in bytes (256 bits).
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime.
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Signs and verifies session tokens.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::WeakSecret(MIN_SECRET_LEN));
        }
        if ttl.is_zero() || ttl > MAX_TOKEN_TTL {
            return Err(AuthError::InvalidTtl(MAX_TOKEN_TTL.as_secs() / 86_400));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `user`, valid for the configured TTL.
    pub fn issue(&self, user: &User) -> Result<String> {
        self.issue_at(user, Utc::now())
    }

    /// Issues a token as if it were `issued_at`.
    pub fn issue_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<String> {
        let iat = issued_at.timestamp();
        let exp = iat.saturating_add(i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX));
        let claims = Claims::for_user(user, iat, exp);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verifies signature, algorithm and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::Expired,
                    _ => AuthError::InvalidToken,
                }
            })
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use retail_models::Role;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn user() -> User {
        let mut user = User::new("Ana", "ana@shop.com", Role::Manager, Some("s-1".into()));
        user.id = "u-1".into();
        user
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SECRET, Duration::from_secs(3600)).unwrap()
    }

    #[test]
    fn test_weak_secret_rejected() {
        let result = TokenIssuer::new(b"short", Duration::from_secs(60));
        assert!(matches!(result, Err(AuthError::WeakSecret(32))));
    }

    #[test]
    fn test_ttl_bounds() {
        for ttl in [
            Duration::ZERO,
            MAX_TOKEN_TTL + Duration::from_secs(1),
            Duration::from_secs(u64::MAX),
        ] {
            let result = TokenIssuer::new(SECRET, ttl);
            assert!(matches!(result, Err(AuthError::InvalidTtl(365))));
        }

        let issuer = TokenIssuer::new(SECRET, MAX_TOKEN_TTL).unwrap();
        let token = issuer.issue(&user()).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_TOKEN_TTL.as_secs() as i64);
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = issuer();
        let token = issuer.issue(&user()).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.store_id.as_deref(), Some("s-1"));
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token() {
        let issuer = issuer();
        let token = issuer
            .issue_at(&user(), Utc::now() - chrono::Duration::hours(2))
            .unwrap();
        assert_eq!(issuer.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn test_tampered_and_foreign_tokens() {
        let issuer = issuer();
        let token = issuer.issue(&user()).unwrap();

        let (signed, signature) = token.rsplit_once('.').unwrap();
        let flipped = if signature.starts_with('A') { 'B' } else { 'A' };
        let tampered = format!("{}.{}{}", signed, flipped, &signature[1..]);
        assert_eq!(issuer.verify(&tampered), Err(AuthError::InvalidToken));

        let other = TokenIssuer::new(b"ffffffffffffffffffffffffffffffff", Duration::from_secs(60))
            .unwrap();
        assert_eq!(other.verify(&token), Err(AuthError::InvalidToken));

        assert_eq!(issuer.verify("not.a.jwt"), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer   xyz "), Some("xyz"));
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer"), None);
    }
}
