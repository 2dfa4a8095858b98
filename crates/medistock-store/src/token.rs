//! JWT id tokens for the local identity provider.
//!
//! Handles id token issuing and verification (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthProviderError, AuthResult};

/// Default id token lifetime: one hour.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user uid)
    pub sub: String,

    /// Account email
    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// Id token issuer.
pub struct TokenIssuer {
    secret: String,
    lifetime_secs: i64,
}

impl TokenIssuer {
    /// Create a new issuer.
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        TokenIssuer {
            secret: secret.into(),
            lifetime_secs,
        }
    }

    /// Issuer with a random per-process secret.
    pub fn ephemeral() -> Self {
        TokenIssuer::new(Uuid::new_v4().to_string(), DEFAULT_TOKEN_LIFETIME_SECS)
    }

    /// Generate an id token for a user.
    pub fn issue(&self, uid: &str, email: &str) -> AuthResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: uid.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthProviderError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AuthProviderError::Internal(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}

impl Default for TokenIssuer {
    fn default() -> Self {
        TokenIssuer::ephemeral()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let issuer = TokenIssuer::new("test-secret", 3600);

        let token = issuer.issue("uid-001", "nurse@example.com").unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.sub, "uid-001");
        assert_eq!(claims.email, "nurse@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenIssuer::new("secret-a", 3600);
        let other = TokenIssuer::new("secret-b", 3600);

        let token = issuer.issue("uid-001", "nurse@example.com").unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60s validation leeway
        let issuer = TokenIssuer::new("test-secret", -120);
        let token = issuer.issue("uid-001", "nurse@example.com").unwrap();
        assert!(issuer.verify(&token).is_err());
    }
}
