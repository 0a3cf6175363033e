use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct Account {
    pub username: String,
    pub credential_digest: String,
    pub failed_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl Account {
    pub const fn new(username: String, credential_digest: String) -> Self {
        Self {
            username,
            credential_digest,
            failed_attempts: 0,
            locked_until: None,
        }
    }

    #[must_use]
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct LockoutPolicy {
    pub max_failed_attempts: u32,
    pub lockout: TimeDelta,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout: TimeDelta::minutes(5),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailedLogin {
    Counted { failed_attempts: u32 },
    LockedUntil(DateTime<Utc>),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct Accounts(Arc<[Account]>);

impl Accounts {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn find(&self, username: &str) -> Option<&Account> {
        self.0.iter().find(|account| account.username == username)
    }

    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.find(username).is_some()
    }

    /// `None` when the username is already taken.
    #[must_use]
    pub fn with_registered(&self, account: Account) -> Option<Self> {
        if self.contains(&account.username) {
            return None;
        }
        let next = self.0.iter().cloned().chain(Some(account)).collect();
        Some(Self(next))
    }

    pub fn with_successful_login(&self, username: &str) -> Self {
        self.with_updated(username, |account| account.failed_attempts = 0)
    }

    /// Only a successful login resets the counter.
    pub fn with_failed_login(
        &self,
        username: &str,
        now: DateTime<Utc>,
        policy: LockoutPolicy,
    ) -> (Self, Option<FailedLogin>) {
        let mut outcome = None;
        let next = self.with_updated(username, |account| {
            account.failed_attempts = account.failed_attempts.saturating_add(1);
            if account.failed_attempts >= policy.max_failed_attempts {
                let until = now
                    .checked_add_signed(policy.lockout)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                account.locked_until = Some(until);
                outcome = Some(FailedLogin::LockedUntil(until));
            } else {
                outcome = Some(FailedLogin::Counted {
                    failed_attempts: account.failed_attempts,
                });
            }
        });
        (next, outcome)
    }

    fn with_updated(&self, username: &str, update: impl FnOnce(&mut Account)) -> Self {
        let mut update = Some(update);
        let next = self
            .0
            .iter()
            .cloned()
            .map(|mut account| {
                if account.username == username {
                    if let Some(update) = update.take() {
                        update(&mut account);
                    }
                }
                account
            })
            .collect();
        Self(next)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct Message {
    text: String,
}

impl Message {
    pub(crate) const fn from_sanitized(text: String) -> Self {
        Self { text }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
