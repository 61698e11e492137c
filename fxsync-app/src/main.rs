//! # Fxsync Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the store adapter and the CNB feed client
//! - Create the rate service
//! - Seed today's rates and start the daily scheduler
//! - Start the HTTP server

mod config;

use std::sync::Arc;
use std::time::Duration;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fxsync_hex::{
    RateService,
    inbound::{DailySync, HttpServer, RateLimiterState},
    outbound::CnbFeedClient,
};
use fxsync_repo::build_repo;

/// Env var that switches on span export.
const OTLP_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("fxsync-service"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize OpenTelemetry tracing only when a collector is configured
    let otel = if std::env::var_os(OTLP_ENDPOINT_VAR).is_some() {
        Some(init_tracer()?)
    } else {
        None
    };
    let telemetry = otel
        .as_ref()
        .map(|(tracer, _)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fxsync_app=debug,fxsync_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting fxsync server on port {}", config.port);
    tracing::info!(feed = %config.feed_url, sync_at = %config.sync_at, "Feed settings");

    // Build repository (handles connection and migration)
    let repo = Arc::new(build_repo(&config.database_url).await?);
    tracing::info!("Using {} store", repo.backend());

    let feed = Arc::new(CnbFeedClient::new(&config.feed_url, config.fetch_timeout)?);

    // Create the rate service
    let service = Arc::new(
        RateService::from_shared(repo.clone(), feed).with_max_sync_days(config.max_sync_range_days),
    );

    // Seed today's rates, then sync once a day
    let scheduler = DailySync::spawn(service.clone(), config.sync_at);

    // Create and run the HTTP server
    let limiter = RateLimiterState::new(config.sync_rate_limit_per_minute, Duration::from_secs(60))
        .trust_forwarded_for(config.trust_forwarded_for);
    let server = HttpServer::with_rate_limiter(service, limiter);
    let addr = format!("0.0.0.0:{}", config.port);

    let result = server.run(&addr).await;

    scheduler.abort();
    repo.close().await;

    // Ensure traces are flushed before exit
    if let Some((_, provider)) = otel {
        let _ = provider.shutdown();
    }
    result
}
