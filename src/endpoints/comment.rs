use super::{Notice, PageContext, render_page};
use crate::auth::Session;
use crate::state::SharedState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Form, debug_handler};
use serde::Deserialize;
use tracing::instrument;

#[derive(Deserialize, Debug)]
#[must_use]
pub struct CommentForm {
    comment: String,
}

#[instrument(skip_all, fields(username = account.username))]
#[debug_handler]
pub async fn submit(
    State(state): State<SharedState>,
    Session(account): Session,
    Form(form): Form<CommentForm>,
) -> Response {
    let (status, notice) = match state.repository.messages.submit(&form.comment).await {
        Ok(_message) => (StatusCode::OK, None),
        Err(error) => (StatusCode::UNPROCESSABLE_ENTITY, Some(Notice::error(&error))),
    };

    let context = PageContext {
        notice,
        username: &account.username,
        comment: &form.comment,
    };
    render_page(&state, status, context).await
}
