//! Main HTTP Gateway Server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use axum::{
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use statusgate_config::StatusGateConfig;
use statusgate_core::{GateError, IdentityVerifier};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{info, instrument};

use crate::auth;
use crate::credentials::CredentialStore;
use crate::db_probe::MySqlProbe;
use crate::health_api;
use crate::host;
use crate::identity::AdminVerifier;
use crate::login_api;
use crate::metrics_api;
use crate::policy::RoutingOptions;
use crate::rate_limit::RateLimiter;
use crate::status::{self, StatusReporter};
use crate::token::TokenService;

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub credentials: Arc<CredentialStore>,
    pub limiter: RateLimiter,
    pub tokens: TokenService,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub reporter: Arc<StatusReporter>,
    pub routing: RoutingOptions,
    pub sweep_interval: Duration,
}

impl GatewayState {
    /// Builds every gateway component from a validated config.
    pub fn from_config(config: &StatusGateConfig) -> Result<Self, GateError> {
        let started = Instant::now();
        let credentials = CredentialStore::from_config(&config.auth)?;
        let tokens = TokenService::new(credentials.signing_secret(), config.auth.token_lifetime_secs);

        let verifier = AdminVerifier::from_config(&config.auth)
            .map_err(|e| GateError::ConfigError(e.to_string()))?;

        let mut reporter = StatusReporter::new(
            host::hostname(),
            config.server.message.clone(),
            config.server.security_summary.clone(),
            started,
        );
        if config.database.enabled {
            reporter = reporter.with_probe(
                Arc::new(MySqlProbe::from_config(&config.database)),
                Duration::from_millis(config.database.timeout_ms),
            );
        }

        Ok(Self {
            credentials: Arc::new(credentials),
            limiter: RateLimiter::from_config(&config.rate_limits),
            tokens,
            verifier: Arc::new(verifier),
            reporter: Arc::new(reporter),
            routing: RoutingOptions {
                trust_proxy: config.server.trust_proxy,
                exempt_health: config.rate_limits.exempt_health,
            },
            sweep_interval: Duration::from_secs(config.rate_limits.sweep_interval_secs),
        })
    }

    pub fn with_reporter(mut self, reporter: StatusReporter) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn IdentityVerifier>) -> Self {
        self.verifier = verifier;
        self
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

/// All routes behind the admission layer, plus CORS, security headers and tracing.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(health_api::get_health))
        .route("/api/auth/login", post(login_api::login))
        .route("/api/status", get(status::get_status))
        .route("/api", get(status::get_status))
        .route("/api/", get(status::get_status))
        .route("/api/admin/metrics", get(metrics_api::get_metrics))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), auth::admission_layer))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received; draining connections");
}

/// Starts the HTTP server and the rate-limit sweeper; returns after a
/// graceful shutdown.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let sweeper = state.limiter.spawn_sweeper(state.sweep_interval);
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Gateway HTTP server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.abort();
    info!("Gateway stopped");
    Ok(())
}
