use crate::auth::hasher::{CredentialHasher, HashError};
use crate::auth::password::validate_password;
use crate::clock::Clock;
use crate::models::{Account, Accounts, FailedLogin, LockoutPolicy};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::instrument;

#[derive(Debug, Clone)]
#[must_use]
pub struct AccountRepository {
    pub(super) accounts: Arc<RwLock<Accounts>>,
    pub(super) login_gate: Arc<Mutex<()>>,
    pub(super) hasher: CredentialHasher,
    pub(super) policy: LockoutPolicy,
    pub(super) clock: Arc<dyn Clock>,
}

impl AccountRepository {
    pub async fn snapshot(&self) -> Accounts {
        self.accounts.read().await.clone()
    }

    #[instrument(skip(self))]
    pub async fn find_by_username(&self, username: &str) -> Option<Account> {
        tracing::trace!("Searching for account in the repository");
        self.accounts.read().await.find(username).cloned()
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Account, RegistrationError> {
        if self.accounts.read().await.contains(username) {
            tracing::debug!("Rejecting registration: username is taken");
            return Err(RegistrationError::DuplicateUser);
        }

        if !validate_password(password) {
            tracing::debug!("Rejecting registration: password too weak");
            return Err(RegistrationError::WeakPassword);
        }

        let digest = self
            .hasher
            .hash(password)
            .await
            .inspect_err(|error| tracing::error!(?error, "Failed to hash password"))?;
        let account = Account::new(username.to_owned(), digest);

        // The name may have been taken while hashing.
        let mut accounts = self.accounts.write().await;
        let next = accounts.with_registered(account.clone()).ok_or_else(|| {
            tracing::debug!("Rejecting registration: username was taken while hashing");
            RegistrationError::DuplicateUser
        })?;
        *accounts = next;

        tracing::debug!("Successfully registered new account");
        Ok(account)
    }

    /// Serialized from lockout check to commit.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Account, LoginError> {
        let _gate = self.login_gate.lock().await;
        let account = self.find_by_username(username).await.ok_or_else(|| {
            tracing::debug!("Rejecting login attempt: no such user");
            LoginError::UserNotFound
        })?;

        let now = self.clock.now();
        if let Some(until) = account.locked_until.filter(|_| account.is_locked_at(now)) {
            tracing::debug!(%until, "Rejecting login attempt: account is locked");
            return Err(LoginError::AccountLocked { until });
        }

        let is_match = self
            .hasher
            .verify(password, &account.credential_digest)
            .await
            .inspect_err(|error| tracing::error!(?error, "Failed to verify password hash"))?;

        let mut accounts = self.accounts.write().await;
        if is_match {
            *accounts = accounts.with_successful_login(username);
            tracing::debug!("Login successful");
            return accounts
                .find(username)
                .cloned()
                .ok_or(LoginError::UserNotFound);
        }

        let (next, outcome) = accounts.with_failed_login(username, now, self.policy);
        *accounts = next;
        match outcome {
            Some(FailedLogin::LockedUntil(until)) => {
                tracing::info!(%until, "Locking account after repeated failures");
                Err(LoginError::AccountLockedJustNow { until })
            }
            Some(FailedLogin::Counted { failed_attempts }) => {
                tracing::debug!(failed_attempts, "Rejecting login attempt: invalid credentials");
                Err(LoginError::InvalidCredentials)
            }
            None => Err(LoginError::UserNotFound),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("User already exists")]
    DuplicateUser,

    #[error(
        "Password must be at least 8 characters long and include an uppercase letter, \
         a lowercase letter, a digit and a special character."
    )]
    WeakPassword,

    #[error("Failed to hash the password")]
    Hash(#[from] HashError),
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("User not found")]
    UserNotFound,

    #[error("Account locked. Try again later.")]
    AccountLocked { until: DateTime<Utc> },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account locked after too many failed attempts.")]
    AccountLockedJustNow { until: DateTime<Utc> },

    #[error("Failed to verify the password")]
    Hash(#[from] HashError),
}
