use crate::auth::hasher::CredentialHasher;
use crate::clock::Clock;
use crate::models::LockoutPolicy;
use std::sync::Arc;

pub mod account;
pub mod message;
pub mod session;

#[derive(Debug, Clone)]
#[must_use]
pub struct Repository {
    pub accounts: account::AccountRepository,
    pub messages: message::MessageRepository,
    pub session: session::SessionRepository,
}

impl Repository {
    pub fn new(hasher: CredentialHasher, policy: LockoutPolicy, clock: Arc<dyn Clock>) -> Self {
        let accounts = account::AccountRepository {
            accounts: Arc::default(),
            login_gate: Arc::default(),
            hasher,
            policy,
            clock,
        };
        Self {
            accounts,
            messages: message::MessageRepository::default(),
            session: session::SessionRepository::default(),
        }
    }
}
