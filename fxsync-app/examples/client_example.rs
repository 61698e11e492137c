//! Client example: syncs a week of live CNB fixings and prints a report.
//!
//! Run with: cargo run -p fxsync-app --example client_example
//!
//! Needs outbound network access to www.cnb.cz.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Local};
use fxsync_client::FxsyncClient;
use fxsync_hex::{
    RateService,
    inbound::HttpServer,
    outbound::{CnbFeedClient, DEFAULT_FEED_URL},
};
use fxsync_repo::build_repo;
use tempfile::tempdir;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let port = addr.port();
    drop(listener);

    // Use a temp file-backed SQLite DB
    let tmp = tempdir()?;
    let db_path = tmp.path().join("rates.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    println!("🚀 Starting server on port {port}...");
    println!("   Database: {db_url}");

    // Build repository (handles connection and migration)
    let repo = build_repo(&db_url).await?;
    let feed = CnbFeedClient::new(DEFAULT_FEED_URL, Duration::from_secs(30))?;

    // Start server in background
    let service = Arc::new(RateService::new(repo, feed));
    let server = HttpServer::new(service);
    let server_addr = format!("127.0.0.1:{port}");
    tokio::spawn(async move { server.run(&server_addr).await });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(500)).await;

    let client = FxsyncClient::new(format!("http://127.0.0.1:{port}"));
    println!("✅ Server health: {}", client.health().await?);

    // ─────────────────────────────────────────────────────────────────────────
    // Demo: sync the last seven days, then report
    // ─────────────────────────────────────────────────────────────────────────

    let end = Local::now().date_naive();
    let start = end - Days::new(6);

    let synced = client.sync_range(start, end).await?;
    println!(
        "✅ Synced {start}..{end}: {} rows, {} failed dates",
        synced.rows_upserted, synced.days_failed
    );
    for summary in &synced.summaries {
        println!(
            "   {} {:?} rows={} dropped={}",
            summary.date,
            summary.status,
            summary.rows_upserted,
            summary.diagnostics.len()
        );
    }

    let report = client.report(start, end, ["USD", "EUR", "GBP"]).await?;
    println!("\n📋 Report:");
    for entry in report {
        println!(
            "   {}: min {:.3} max {:.3} avg {:.3} ({} samples)",
            entry.currency_code, entry.min_rate, entry.max_rate, entry.avg_rate, entry.samples
        );
    }

    println!("\n🎉 Example completed successfully!");

    Ok(())
}
