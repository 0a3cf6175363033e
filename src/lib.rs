#![allow(clippy::missing_errors_doc)]

use axum::routing::{get, post};
use axum::{Router, middleware};
use chrono::TimeDelta;
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::instrument;

use crate::auth::hasher::CredentialHasher;
use crate::clock::{Clock, SystemClock};
use crate::models::LockoutPolicy;
use crate::repository::Repository;
use crate::state::SharedState;

pub mod auth;
pub mod clock;
pub mod endpoints;
pub mod layers;
pub mod models;
pub mod repository;
pub mod sanitize;
pub mod state;

/// One year.
pub const MAX_LOCKOUT_MINUTES: i64 = 525_600;

#[derive(Parser, Clone, Debug)]
#[must_use]
pub struct Settings {
    #[arg(default_value_t = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000))]
    pub socket_addr: SocketAddr,

    /// Consecutive failed logins that lock an account.
    #[arg(long, default_value_t = 5)]
    pub max_failed_attempts: u32,

    #[arg(
        long,
        default_value_t = 5,
        value_parser = clap::value_parser!(i64).range(1..=MAX_LOCKOUT_MINUTES),
    )]
    pub lockout_minutes: i64,

    #[arg(long, default_value_t = argon2::Params::DEFAULT_M_COST)]
    pub argon2_memory_kib: u32,

    #[arg(long, default_value_t = argon2::Params::DEFAULT_T_COST)]
    pub argon2_iterations: u32,

    /// Tracing filter directives; overrides `RUST_LOG`.
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl Settings {
    pub fn telemetry(&self) -> layers::Telemetry {
        layers::Telemetry {
            log_filter: self.log_filter.clone(),
        }
    }

    pub fn lockout_policy(&self) -> LockoutPolicy {
        LockoutPolicy {
            max_failed_attempts: self.max_failed_attempts,
            lockout: TimeDelta::minutes(self.lockout_minutes),
        }
    }

    pub fn shared_state(
        &self,
        clock: Arc<dyn Clock>,
    ) -> Result<SharedState, color_eyre::eyre::Report> {
        let hasher = CredentialHasher::new(self.argon2_memory_kib, self.argon2_iterations)?;
        let repository = Repository::new(hasher, self.lockout_policy(), clock);
        Ok(SharedState { repository })
    }
}

pub fn router(shared_state: SharedState) -> Router {
    Router::new()
        .route("/", get(endpoints::root))
        .route("/account", post(endpoints::account::submit))
        .route("/comment", post(endpoints::comment::submit))
        .layer(middleware::from_fn_with_state(
            shared_state.clone(),
            layers::record_session_user,
        ))
        .layer(layers::trace_layer())
        .with_state(shared_state)
}

#[instrument]
pub async fn run(settings: Settings) -> Result<(), color_eyre::eyre::Report> {
    let shared_state = settings.shared_state(Arc::new(SystemClock))?;
    let router = self::router(shared_state.clone());

    let listener = TcpListener::bind(settings.socket_addr).await?;
    tracing::info!(
        listen_addr = ?listener.local_addr()?,
        policy = ?settings.lockout_policy(),
        "Serving in-memory comment box",
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(self::discard_state_on_ctrl_c(shared_state))
        .await?;

    Ok(())
}

/// Nothing is persisted, so shutting down drops every account and message.
#[instrument(skip_all)]
async fn discard_state_on_ctrl_c(state: SharedState) {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(?error, "Failed to await CTRL+C signal");
        return;
    }
    let accounts = state.repository.accounts.snapshot().await.len();
    let messages = state.repository.messages.all().await.len();
    tracing::info!(accounts, messages, "Caught CTRL+C, discarding in-memory state");
}
