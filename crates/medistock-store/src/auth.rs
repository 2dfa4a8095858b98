//! # Identity Provider
//!
//! The [`AuthProvider`] contract and a local, emulator-style implementation.
//!
//! ## Local Provider Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_user(email, password)                                          │
//! │       │                                                                 │
//! │       ├── email not local@domain     → InvalidEmail                    │
//! │       ├── password < 6 characters    → WeakPassword                    │
//! │       ├── email already registered   → EmailAlreadyInUse               │
//! │       ▼                                                                 │
//! │  argon2 hash → store user → issue id token (JWT) → signed in           │
//! │                                                                         │
//! │  sign_in(email, password)                                              │
//! │       ├── unknown email              → UserNotFound                    │
//! │       ├── hash mismatch              → WrongCredentials                │
//! │       ▼                                                                 │
//! │  issue id token → signed in                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The provider-side policy is looser than the sign-up policy
//! enforced by the session gateway.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AuthProviderError, AuthResult};
use crate::token::TokenIssuer;

/// Minimum password length the provider itself accepts.
pub const PROVIDER_MIN_PASSWORD_LENGTH: usize = 6;

/// A signed-in account as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub id_token: String,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Registers an account and signs it in.
    async fn create_user(&self, email: &str, password: &str) -> AuthResult<AuthUser>;

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthUser>;

    async fn sign_out(&self) -> AuthResult<()>;

    /// The currently signed-in account, if any.
    async fn current_user(&self) -> Option<AuthUser>;
}

// =============================================================================
// Local Provider
// =============================================================================

struct StoredUser {
    uid: String,
    email: String,
    password_hash: String,
}

/// In-process identity provider.
pub struct LocalAuthProvider {
    users: RwLock<HashMap<String, StoredUser>>,
    current: RwLock<Option<AuthUser>>,
    issuer: TokenIssuer,
    unavailable: AtomicBool,
}

impl LocalAuthProvider {
    pub fn new(issuer: TokenIssuer) -> Self {
        LocalAuthProvider {
            users: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            issuer,
            unavailable: AtomicBool::new(false),
        }
    }

    /// Simulates the provider being unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// The issuer used to sign id tokens, for verification by callers.
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    fn ensure_available(&self) -> AuthResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuthProviderError::Unavailable("network unreachable".to_string()));
        }
        Ok(())
    }

    async fn start_session(&self, uid: &str, email: &str) -> AuthResult<AuthUser> {
        let user = AuthUser {
            uid: uid.to_string(),
            email: email.to_string(),
            id_token: self.issuer.issue(uid, email)?,
        };
        *self.current.write().await = Some(user.clone());
        Ok(user)
    }
}

impl Default for LocalAuthProvider {
    fn default() -> Self {
        LocalAuthProvider::new(TokenIssuer::ephemeral())
    }
}

/// Loose `local@domain` shape check.
fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}

fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthProviderError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn create_user(&self, email: &str, password: &str) -> AuthResult<AuthUser> {
        self.ensure_available()?;

        let email = email.trim();
        if !is_plausible_email(email) {
            return Err(AuthProviderError::InvalidEmail);
        }
        if password.chars().count() < PROVIDER_MIN_PASSWORD_LENGTH {
            return Err(AuthProviderError::WeakPassword);
        }

        let key = email.to_lowercase();
        let uid = {
            let mut users = self.users.write().await;
            if users.contains_key(&key) {
                return Err(AuthProviderError::EmailAlreadyInUse);
            }

            let uid = Uuid::new_v4().to_string();
            users.insert(
                key,
                StoredUser {
                    uid: uid.clone(),
                    email: email.to_string(),
                    password_hash: hash_password(password)?,
                },
            );
            uid
        };

        info!(uid = %uid, "Account created");
        self.start_session(&uid, email).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthUser> {
        self.ensure_available()?;

        let (uid, stored_email) = {
            let users = self.users.read().await;
            let user = users
                .get(&email.trim().to_lowercase())
                .ok_or(AuthProviderError::UserNotFound)?;

            if !verify_password(password, &user.password_hash) {
                debug!(uid = %user.uid, "Password mismatch");
                return Err(AuthProviderError::WrongCredentials);
            }
            (user.uid.clone(), user.email.clone())
        };

        info!(uid = %uid, "Signed in");
        self.start_session(&uid, &stored_email).await
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.ensure_available()?;
        *self.current.write().await = None;
        Ok(())
    }

    async fn current_user(&self) -> Option<AuthUser> {
        self.current.read().await.clone()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
