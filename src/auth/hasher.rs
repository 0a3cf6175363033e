use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use rand_core::OsRng;
use tokio::task::{JoinError, spawn_blocking};
use tracing::instrument;

/// Argon2 hashing on the blocking pool.
#[derive(Debug, Clone)]
#[must_use]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, HashError> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(HashError::Params)?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    #[instrument(skip_all, err(Debug))]
    pub async fn hash(&self, password: &str) -> Result<String, HashError> {
        let argon2 = self.argon2();
        let password = password.to_owned();
        spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(HashError::Hash)
        })
        .await?
    }

    /// `Ok(false)` is a mismatch; a bad digest is an error.
    #[instrument(skip_all, err(Debug))]
    pub async fn verify(&self, password: &str, digest: &str) -> Result<bool, HashError> {
        let argon2 = self.argon2();
        let password = password.to_owned();
        let digest = digest.to_owned();
        spawn_blocking(move || {
            let stored_hash = PasswordHash::new(&digest).map_err(HashError::Hash)?;
            match argon2.verify_password(password.as_bytes(), &stored_hash) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(error) => Err(HashError::Hash(error)),
            }
        })
        .await?
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("Invalid Argon2 parameters: {0}")]
    Params(argon2::Error),

    #[error("Failed to hash or verify the password: {0}")]
    Hash(argon2::password_hash::Error),

    #[error("Hashing task did not complete")]
    Task(#[from] JoinError),
}
