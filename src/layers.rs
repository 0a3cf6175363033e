use crate::state::SharedState;
use axum::body::Body;
use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing::field::Empty;

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct Telemetry {
    pub log_filter: Option<String>,
}

impl Telemetry {
    /// `--log-filter` wins over `RUST_LOG`, which wins over the crate default.
    #[must_use]
    pub fn directives(&self, rust_log: Option<String>) -> String {
        let crate_name = env!("CARGO_CRATE_NAME");
        self.log_filter
            .clone()
            .or(rust_log)
            .filter(|directives| !directives.trim().is_empty())
            .unwrap_or_else(|| {
                format!("{crate_name}=trace,tower_http=debug,axum::rejection=trace")
            })
    }

    pub fn install(&self) -> Result<(), color_eyre::eyre::Error> {
        use tracing_error::ErrorLayer;
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{EnvFilter, fmt};

        color_eyre::install()?;

        let directives = self.directives(std::env::var(EnvFilter::DEFAULT_ENV).ok());
        let filter_layer = EnvFilter::try_new(&directives)?;
        let format_layer = fmt::layer()
            .pretty()
            .without_time()
            .with_target(true)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter_layer)
            .with(format_layer)
            .with(ErrorLayer::default())
            .try_init()?;

        tracing::debug!(directives, "Telemetry installed");
        Ok(())
    }
}

type Classifier =
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>;

#[must_use]
pub fn trace_layer() -> TraceLayer<Classifier, impl Clone + Fn(&Request<Body>) -> Span> {
    TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let matched_path = request
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str);
        tracing::info_span!(
            "http_request",
            method = ?request.method(),
            matched_path,
            session.user = Empty,
        )
    })
}

/// Runs inside the `http_request` span and fills in `session.user`.
pub async fn record_session_user(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(username) = state.repository.session.current().await {
        Span::current().record("session.user", username.as_str());
    }
    next.run(request).await
}
