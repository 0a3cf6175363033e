use super::{Notice, PageContext, render_page};
use crate::repository::account::{LoginError, RegistrationError};
use crate::state::SharedState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Form, debug_handler};
use serde::Deserialize;
use tracing::instrument;

pub const REGISTERED_NOTICE: &str = "User registered";
pub const LOGGED_IN_NOTICE: &str = "Login successful";

#[derive(Deserialize)]
#[must_use]
pub struct CredentialsForm {
    username: String,
    password: String,
    action: SubmitAction,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[must_use]
pub enum SubmitAction {
    Register,
    Login,
}

#[instrument(skip_all, fields(username = credentials.username, action = ?credentials.action))]
#[debug_handler]
pub async fn submit(
    State(state): State<SharedState>,
    Form(credentials): Form<CredentialsForm>,
) -> Response {
    let (status, notice) = match credentials.action {
        SubmitAction::Register => register(&state, &credentials).await,
        SubmitAction::Login => login(&state, &credentials).await,
    };

    let context = PageContext {
        notice: Some(notice),
        username: &credentials.username,
        comment: "",
    };
    render_page(&state, status, context).await
}

async fn register(state: &SharedState, credentials: &CredentialsForm) -> (StatusCode, Notice) {
    let result = state
        .repository
        .accounts
        .register(&credentials.username, &credentials.password)
        .await;

    match result {
        Ok(_account) => (StatusCode::OK, Notice::success(REGISTERED_NOTICE)),
        Err(error) => {
            let status = match error {
                RegistrationError::DuplicateUser => StatusCode::CONFLICT,
                RegistrationError::WeakPassword => StatusCode::UNPROCESSABLE_ENTITY,
                RegistrationError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Notice::error(&error))
        }
    }
}

async fn login(state: &SharedState, credentials: &CredentialsForm) -> (StatusCode, Notice) {
    let result = state
        .repository
        .accounts
        .login(&credentials.username, &credentials.password)
        .await;

    match result {
        Ok(account) => {
            state.repository.session.start(&account.username).await;
            (StatusCode::OK, Notice::success(LOGGED_IN_NOTICE))
        }
        Err(error) => {
            let status = match error {
                LoginError::UserNotFound => StatusCode::NOT_FOUND,
                LoginError::AccountLocked { .. } | LoginError::AccountLockedJustNow { .. } => {
                    StatusCode::LOCKED
                }
                LoginError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                LoginError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Notice::error(&error))
        }
    }
}
