use crate::models::Message;
use crate::sanitize::sanitize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct MessageRepository {
    pub(super) messages: Arc<RwLock<Vec<Message>>>,
}

impl MessageRepository {
    pub async fn all(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    #[instrument(skip_all, fields(comment.len = comment.len()))]
    pub async fn submit(&self, comment: &str) -> Result<Message, CommentError> {
        let sanitized = sanitize(comment);
        // Whitespace-only input is accepted.
        if comment.is_empty() && comment.trim().is_empty() {
            tracing::debug!("Rejecting empty comment");
            return Err(CommentError::EmptyMessage);
        }

        let message = Message::from_sanitized(sanitized);
        self.messages.write().await.push(message.clone());
        tracing::trace!("Stored sanitized comment");
        Ok(message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommentError {
    #[error("You cannot send an empty message")]
    EmptyMessage,
}
