//! HTTP Server configuration and startup.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use fxsync_types::{FeedSource, RateStore};

use super::handlers::{self, AppState};
use super::rate_limit::{RateLimiterState, rate_limit_middleware};
use crate::RateService;
use crate::openapi::ApiDoc;

/// HTTP Server for the fixing rate API.
pub struct HttpServer<S: RateStore, F: FeedSource> {
    state: Arc<AppState<S, F>>,
    rate_limiter: Arc<RateLimiterState>,
}

impl<S: RateStore, F: FeedSource> HttpServer<S, F> {
    /// Creates a new HTTP server with the default sync quota.
    pub fn new(service: Arc<RateService<S, F>>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            rate_limiter: Arc::new(RateLimiterState::default()),
        }
    }

    /// Creates a new HTTP server with a custom per-client sync quota.
    pub fn with_rate_limit(service: Arc<RateService<S, F>>, requests_per_minute: u32) -> Self {
        Self::with_rate_limiter(
            service,
            RateLimiterState::new(requests_per_minute, Duration::from_secs(60)),
        )
    }

    /// Creates a new HTTP server with a fully configured sync rate limiter.
    pub fn with_rate_limiter(service: Arc<RateService<S, F>>, limiter: RateLimiterState) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            rate_limiter: Arc::new(limiter),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        // Only the routes that reach the upstream feed are throttled.
        let sync_routes = Router::new()
            .route("/api/sync/{date}", post(handlers::sync_day::<S, F>))
            .route("/api/sync/{start}/{end}", post(handlers::sync_range::<S, F>))
            .route_layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ));

        Router::new()
            .route("/health", get(handlers::health))
            .route(
                "/api/report/{start}/{end}/{currencies}",
                get(handlers::report::<S, F>),
            )
            .route("/api/rates", get(handlers::list_rates::<S, F>))
            .merge(sync_routes)
            .layer(metrics)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        let app = self.router().into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
