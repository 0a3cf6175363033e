use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct SessionRepository {
    pub(super) current: Arc<RwLock<Option<String>>>,
}

impl SessionRepository {
    pub async fn current(&self) -> Option<String> {
        self.current.read().await.clone()
    }

    #[instrument(skip(self))]
    pub async fn start(&self, username: &str) {
        let previous = self.current.write().await.replace(username.to_owned());
        tracing::debug!(?previous, "Session started");
    }
}
