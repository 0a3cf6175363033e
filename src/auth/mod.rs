use crate::models::Account;
use crate::state::SharedState;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect};
use tracing::{Level, instrument};

pub mod hasher;
pub mod password;

#[derive(Debug)]
#[must_use]
pub struct Session(pub Account);

impl<S> FromRequestParts<S> for Session
where
    SharedState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = RejectionCause;

    #[instrument(name = "auth_layer", skip_all, err(Debug, level = Level::DEBUG))]
    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = SharedState::from_ref(state);
        let username = state
            .repository
            .session
            .current()
            .await
            .ok_or(RejectionCause::NoSession)?;
        let account = state
            .repository
            .accounts
            .find_by_username(&username)
            .await
            .ok_or(RejectionCause::UnknownAccount)?;

        tracing::trace!(username = account.username, "Session lookup successful");
        Ok(Self(account))
    }
}

#[derive(Debug)]
#[must_use]
pub enum RejectionCause {
    NoSession,
    UnknownAccount,
}

impl IntoResponse for RejectionCause {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::NoSession | Self::UnknownAccount => Redirect::to("/").into_response(),
        }
    }
}
