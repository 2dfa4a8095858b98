//! # Session Gateway
//!
//! Sign-up, sign-in and sign-out against an [`AuthProvider`], with the
//! provider's errors folded into the user-facing [`MedicError`] taxonomy.
//!
//! ## Sign-Up Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sign_up(email, password)                                              │
//! │       │                                                                 │
//! │       ├── email empty?              → InvalidEmail   (no provider call)│
//! │       ├── password policy fails?    → WeakPassword   (no provider call)│
//! │       ▼                                                                 │
//! │  provider.create_user                                                  │
//! │       │                                                                 │
//! │       ├── EmailAlreadyInUse        → EmailAlreadyInUse                 │
//! │       ├── InvalidEmail             → InvalidEmail                      │
//! │       ├── WeakPassword             → WeakPassword                      │
//! │       ├── anything else            → SignUpFailed                      │
//! │       ▼                                                                 │
//! │  session set, error cleared                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use medistock_core::validation::{is_password_strong, validate_email_present};
use medistock_core::{Actor, MedicError, MedicResult};
use medistock_store::{AuthProvider, AuthProviderError, AuthUser};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// The signed-in principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub id_token: String,
}

impl Session {
    /// The actor recorded in history entries.
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id.clone(), self.email.clone())
    }
}

impl From<AuthUser> for Session {
    fn from(user: AuthUser) -> Self {
        Session {
            user_id: user.uid,
            email: user.email,
            id_token: user.id_token,
        }
    }
}

fn map_sign_up_error(err: &AuthProviderError) -> MedicError {
    match err {
        AuthProviderError::EmailAlreadyInUse => MedicError::EmailAlreadyInUse,
        AuthProviderError::InvalidEmail => MedicError::InvalidEmail,
        AuthProviderError::WeakPassword => MedicError::WeakPassword,
        _ => MedicError::SignUpFailed,
    }
}

/// Owns the current session and the authentication error slot.
pub struct SessionGateway {
    provider: Arc<dyn AuthProvider>,
    session: Option<Session>,
    error: Option<MedicError>,
}

impl SessionGateway {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        SessionGateway {
            provider,
            session: None,
            error: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn error(&self) -> Option<MedicError> {
        self.error
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn fail<T>(&mut self, err: MedicError) -> MedicResult<T> {
        self.error = Some(err);
        Err(err)
    }

    fn succeed(&mut self, user: AuthUser) -> Session {
        let session = Session::from(user);
        self.session = Some(session.clone());
        self.error = None;
        session
    }

    /// Adopts the provider's current user, if one is still signed in.
    pub async fn restore(&mut self) -> Option<&Session> {
        if let Some(user) = self.provider.current_user().await {
            debug!(uid = %user.uid, "Restoring session");
            self.session = Some(Session::from(user));
        }
        self.session.as_ref()
    }

    /// Creates an account and signs it in.
    pub async fn sign_up(&mut self, email: &str, password: &str) -> MedicResult<Session> {
        if let Err(err) = validate_email_present(email) {
            return self.fail(err);
        }
        if !is_password_strong(password) {
            return self.fail(MedicError::WeakPassword);
        }

        match self.provider.create_user(email, password).await {
            Ok(user) => {
                info!(uid = %user.uid, "Signed up");
                Ok(self.succeed(user))
            }
            Err(err) => {
                warn!(error = %err, "Sign-up rejected by identity provider");
                self.fail(map_sign_up_error(&err))
            }
        }
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> MedicResult<Session> {
        if let Err(err) = validate_email_present(email) {
            return self.fail(err);
        }
        if password.is_empty() {
            return self.fail(MedicError::InvalidPassword);
        }

        match self.provider.sign_in(email, password).await {
            Ok(user) => {
                info!(uid = %user.uid, "Signed in");
                Ok(self.succeed(user))
            }
            Err(err) => {
                warn!(error = %err, "Sign-in rejected by identity provider");
                self.fail(MedicError::SignInFailed)
            }
        }
    }

    pub async fn sign_out(&mut self) -> MedicResult<()> {
        match self.provider.sign_out().await {
            Ok(()) => {
                self.session = None;
                self.error = None;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Sign-out failed");
                self.fail(MedicError::SignOutFailed)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use medistock_store::{AuthResult, LocalAuthProvider};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const STRONG: &str = "Medistock#2025";

    /// Provider that always answers with the same error and counts calls.
    struct RejectingProvider {
        error: AuthProviderError,
        calls: AtomicUsize,
    }

    impl RejectingProvider {
        fn new(error: AuthProviderError) -> Arc<Self> {
            Arc::new(RejectingProvider {
                error,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl AuthProvider for RejectingProvider {
        async fn create_user(&self, _email: &str, _password: &str) -> AuthResult<AuthUser> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(self.error.clone())
        }

        async fn sign_in(&self, _email: &str, _password: &str) -> AuthResult<AuthUser> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(self.error.clone())
        }

        async fn sign_out(&self) -> AuthResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(self.error.clone())
        }

        async fn current_user(&self) -> Option<AuthUser> {
            None
        }
    }

    fn local_gateway() -> SessionGateway {
        SessionGateway::new(Arc::new(LocalAuthProvider::default()))
    }

    #[tokio::test]
    async fn test_sign_up_success_sets_session() {
        let mut gateway = local_gateway();
        let session = gateway.sign_up("nurse@example.com", STRONG).await.unwrap();

        assert_eq!(session.email, "nurse@example.com");
        assert_eq!(gateway.session(), Some(&session));
        assert_eq!(gateway.error(), None);
        assert_eq!(session.actor().name, "nurse@example.com");
    }

    #[tokio::test]
    async fn test_sign_up_local_checks_skip_provider() {
        let provider = RejectingProvider::new(AuthProviderError::Internal("unused".into()));
        let mut gateway = SessionGateway::new(provider.clone());

        assert_eq!(gateway.sign_up("", STRONG).await, Err(MedicError::InvalidEmail));
        assert_eq!(gateway.error(), Some(MedicError::InvalidEmail));

        assert_eq!(
            gateway.sign_up("nurse@example.com", "weak").await,
            Err(MedicError::WeakPassword)
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sign_up_provider_error_mapping() {
        let cases = [
            (AuthProviderError::EmailAlreadyInUse, MedicError::EmailAlreadyInUse),
            (AuthProviderError::InvalidEmail, MedicError::InvalidEmail),
            (AuthProviderError::WeakPassword, MedicError::WeakPassword),
            (AuthProviderError::Unavailable("down".into()), MedicError::SignUpFailed),
        ];

        for (provider_error, expected) in cases {
            let mut gateway = SessionGateway::new(RejectingProvider::new(provider_error));
            assert_eq!(gateway.sign_up("nurse@example.com", STRONG).await, Err(expected));
            assert!(!gateway.is_signed_in());
        }
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_with_local_provider() {
        let mut gateway = local_gateway();
        gateway.sign_up("nurse@example.com", STRONG).await.unwrap();

        assert_eq!(
            gateway.sign_up("nurse@example.com", STRONG).await,
            Err(MedicError::EmailAlreadyInUse)
        );
    }

    #[tokio::test]
    async fn test_sign_in_validation_and_failure() {
        let mut gateway = local_gateway();

        assert_eq!(gateway.sign_in("", "pw").await, Err(MedicError::InvalidEmail));
        assert_eq!(
            gateway.sign_in("nurse@example.com", "").await,
            Err(MedicError::InvalidPassword)
        );
        assert_eq!(
            gateway.sign_in("ghost@example.com", STRONG).await,
            Err(MedicError::SignInFailed)
        );
        assert_eq!(gateway.error(), Some(MedicError::SignInFailed));
    }

    #[tokio::test]
    async fn test_success_resets_error() {
        let mut gateway = local_gateway();
        gateway.sign_up("nurse@example.com", STRONG).await.unwrap();
        gateway.sign_out().await.unwrap();

        let _ = gateway.sign_in("nurse@example.com", "wrong").await;
        assert_eq!(gateway.error(), Some(MedicError::SignInFailed));

        gateway.sign_in("nurse@example.com", STRONG).await.unwrap();
        assert_eq!(gateway.error(), None);
        assert!(gateway.is_signed_in());
    }

    #[tokio::test]
    async fn test_sign_out() {
        let mut gateway = local_gateway();
        gateway.sign_up("nurse@example.com", STRONG).await.unwrap();

        gateway.sign_out().await.unwrap();
        assert!(gateway.session().is_none());

        let mut failing = SessionGateway::new(RejectingProvider::new(AuthProviderError::Unavailable(
            "offline".into(),
        )));
        assert_eq!(failing.sign_out().await, Err(MedicError::SignOutFailed));
        assert_eq!(failing.error(), Some(MedicError::SignOutFailed));
    }

    #[tokio::test]
    async fn test_restore_adopts_current_user() {
        let provider = Arc::new(LocalAuthProvider::default());
        provider.create_user("nurse@example.com", STRONG).await.unwrap();

        let mut gateway = SessionGateway::new(provider);
        let restored = gateway.restore().await.cloned();
        assert_eq!(restored.map(|s| s.email), Some("nurse@example.com".to_string()));
    }
}
