use crate::models::Message;
use crate::state::SharedState;
use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::debug_handler;
use axum::response::{Html, IntoResponse, Response};
use std::fmt::Display;
use tracing::instrument;

pub mod account;
pub mod comment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "notice success",
            Self::Error => "notice error",
        }
    }
}

#[derive(Debug, Clone)]
#[must_use]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(error: &impl Display) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: error.to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate<'a> {
    pub title: &'a str,
    pub notice: Option<Notice>,
    pub username: &'a str,
    pub logged_in_as: Option<String>,
    pub comment: &'a str,
    pub messages: Vec<Message>,
}

#[derive(Debug, Default)]
#[must_use]
pub struct PageContext<'a> {
    pub notice: Option<Notice>,
    pub username: &'a str,
    pub comment: &'a str,
}

pub async fn render_page(
    state: &SharedState,
    status: StatusCode,
    context: PageContext<'_>,
) -> Response {
    let logged_in_as = state.repository.session.current().await;
    let messages = if logged_in_as.is_some() {
        state.repository.messages.all().await
    } else {
        vec![]
    };

    let template = PageTemplate {
        title: env!("CARGO_CRATE_NAME"),
        notice: context.notice,
        username: context.username,
        logged_in_as,
        comment: context.comment,
        messages,
    };

    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(error) => {
            tracing::error!(?error, "Failed to render page template");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[instrument(skip_all)]
#[debug_handler]
pub async fn root(State(state): State<SharedState>) -> Response {
    tracing::trace!("Serving root page");
    render_page(&state, StatusCode::OK, PageContext::default()).await
}
