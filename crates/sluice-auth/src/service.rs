// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account lifecycle and authentication over the storage layer.

use chrono::{SecondsFormat, Utc};
use sluice_core::{Claims, SluiceError, User, UserState};
use sluice_storage::{Database, StoredUser, queries::users};
use thiserror::Error;
use tracing::{debug, info};

use crate::ids::new_user_id;
use crate::password::{
    MAX_PASSWORD_BYTES, MIN_PASSWORD_BYTES, hash_password, password_within_bounds,
    verify_password,
};
use crate::token::TokenSigner;

/// Policy violations during signup. Everything else surfaces as
/// [`SluiceError`] through the `Store` variant.
#[derive(Debug, Error)]
pub enum SignupError {
    /// The email is malformed or outside the required domain.
    #[error("email must belong to the {0} domain")]
    InvalidDomain(String),

    /// Password byte length outside `6..=72`. Rejected, never truncated.
    #[error("password must be between {MIN_PASSWORD_BYTES} and {MAX_PASSWORD_BYTES} bytes")]
    InvalidPassword,

    /// An active account already holds this email.
    #[error("an account with this email already exists")]
    DuplicateAccount,

    /// Underlying store failure.
    #[error(transparent)]
    Store(#[from] SluiceError),
}

/// Current timestamp in the storage format.
fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The credential store: creates accounts, authenticates, issues and
/// verifies bearer tokens, soft-deletes.
///
/// Credentials are never cached; every operation is a durable read or write
/// against the identity table.
pub struct AccountService {
    db: Database,
    signer: TokenSigner,
    required_domain: String,
}

impl AccountService {
    pub fn new(db: Database, signer: TokenSigner, required_domain: String) -> Self {
        Self {
            db,
            signer,
            required_domain,
        }
    }

    /// Create a new account. The returned [`User`] carries no hash.
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, SignupError> {
        let email = email.trim().to_lowercase();
        match email.rsplit_once('@') {
            Some((local, domain)) if !local.is_empty() && domain == self.required_domain => {}
            _ => return Err(SignupError::InvalidDomain(self.required_domain.clone())),
        }

        if !password_within_bounds(password) {
            return Err(SignupError::InvalidPassword);
        }

        if users::find_active_by_email(&self.db, &email).await?.is_some() {
            return Err(SignupError::DuplicateAccount);
        }

        let now = now_rfc3339();
        let stored = StoredUser {
            user_id: new_user_id()?,
            email,
            password_hash: hash_password(password)?,
            state: UserState::Active,
            created_at: now.clone(),
            updated_at: now,
        };

        match users::insert_user(&self.db, &stored).await {
            Ok(()) => {}
            // A concurrent signup can slip past the pre-check; the partial
            // unique index on active emails is the authority.
            Err(e) if e.to_string().contains("UNIQUE constraint failed") => {
                return Err(SignupError::DuplicateAccount);
            }
            Err(e) => return Err(e.into()),
        }

        info!(user_id = %stored.user_id, "account created");
        Ok(stored.into_user())
    }

    /// Authenticate by email and password.
    ///
    /// Returns `None` identically for unknown email, wrong password, and
    /// deactivated account, so the response carries no oracle.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, SluiceError> {
        let email = email.trim().to_lowercase();
        let Some(stored) = users::find_active_by_email(&self.db, &email).await? else {
            return Ok(None);
        };
        if !verify_password(password, &stored.password_hash) {
            return Ok(None);
        }
        Ok(Some(stored.into_user()))
    }

    /// Mint a signed bearer token for the user.
    pub fn issue_token(&self, user: &User) -> Result<String, SluiceError> {
        self.signer.issue(user)
    }

    /// Verify a bearer token and confirm its user is still active.
    pub async fn verify_token(&self, token: &str) -> Result<Claims, SluiceError> {
        let claims = self.signer.verify(token)?;
        match users::get_user(&self.db, &claims.sub).await? {
            Some(stored) if stored.state == UserState::Active => Ok(claims),
            _ => Err(SluiceError::Unauthorized(
                "token user is not active".to_string(),
            )),
        }
    }

    /// Fetch the active user behind verified claims.
    pub async fn current_user(&self, claims: &Claims) -> Result<Option<User>, SluiceError> {
        Ok(users::get_user(&self.db, &claims.sub)
            .await?
            .filter(|u| u.state == UserState::Active)
            .map(StoredUser::into_user))
    }

    /// Soft-delete an account. Idempotent: false once already inactive.
    pub async fn deactivate(&self, user_id: &str) -> Result<bool, SluiceError> {
        let changed = users::deactivate_user(&self.db, user_id, &now_rfc3339()).await?;
        if changed {
            debug!(user_id, "account deactivated");
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn service() -> (AccountService, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("auth.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let signer = TokenSigner::new(b"test-secret", 7);
        (
            AccountService::new(db, signer, "example.com".to_string()),
            dir,
        )
    }

    #[tokio::test]
    async fn signup_then_authenticate() {
        let (svc, _dir) = service().await;
        let user = svc
            .create_account("Alice@Example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.user_id.len(), 22);

        let authed = svc
            .authenticate("alice@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(authed.unwrap().user_id, user.user_id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let (svc, _dir) = service().await;
        svc.create_account("bob@example.com", "secret1")
            .await
            .unwrap();

        let wrong_password = svc
            .authenticate("bob@example.com", "wrong!!")
            .await
            .unwrap();
        let unknown_email = svc
            .authenticate("nobody@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(wrong_password, unknown_email);
        assert!(wrong_password.is_none());
    }

    #[tokio::test]
    async fn foreign_domain_is_rejected() {
        let (svc, _dir) = service().await;
        let err = svc
            .create_account("eve@elsewhere.org", "secret1")
            .await
            .unwrap_err();
        assert!(matches!(err, SignupError::InvalidDomain(_)));
    }

    #[tokio::test]
    async fn missing_local_part_is_rejected() {
        let (svc, _dir) = service().await;
        let err = svc.create_account("@example.com", "secret1").await.unwrap_err();
        assert!(matches!(err, SignupError::InvalidDomain(_)));
    }

    #[tokio::test]
    async fn password_byte_boundary_is_exact() {
        let (svc, _dir) = service().await;
        svc.create_account("a72@example.com", &"a".repeat(72))
            .await
            .unwrap();
        let err = svc
            .create_account("a73@example.com", &"a".repeat(73))
            .await
            .unwrap_err();
        assert!(matches!(err, SignupError::InvalidPassword));
        let err = svc
            .create_account("short@example.com", "12345")
            .await
            .unwrap_err();
        assert!(matches!(err, SignupError::InvalidPassword));
    }

    #[tokio::test]
    async fn duplicate_active_email_is_rejected() {
        let (svc, _dir) = service().await;
        svc.create_account("dup@example.com", "secret1")
            .await
            .unwrap();
        let err = svc
            .create_account("dup@example.com", "secret2")
            .await
            .unwrap_err();
        assert!(matches!(err, SignupError::DuplicateAccount));
    }

    #[tokio::test]
    async fn deactivated_account_cannot_authenticate_or_use_tokens() {
        let (svc, _dir) = service().await;
        let user = svc
            .create_account("gone@example.com", "secret1")
            .await
            .unwrap();
        let token = svc.issue_token(&user).unwrap();
        assert!(svc.verify_token(&token).await.is_ok());

        assert!(svc.deactivate(&user.user_id).await.unwrap());
        assert!(!svc.deactivate(&user.user_id).await.unwrap());

        // Existing tokens die with the account.
        assert!(svc.verify_token(&token).await.is_err());
        assert!(
            svc.authenticate("gone@example.com", "secret1")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn verify_token_round_trip() {
        let (svc, _dir) = service().await;
        let user = svc
            .create_account("tok@example.com", "secret1")
            .await
            .unwrap();
        let token = svc.issue_token(&user).unwrap();
        let claims = svc.verify_token(&token).await.unwrap();
        assert_eq!(claims.sub, user.user_id);
        assert_eq!(claims.email, "tok@example.com");

        let fetched = svc.current_user(&claims).await.unwrap().unwrap();
        assert_eq!(fetched.user_id, user.user_id);
    }
}
