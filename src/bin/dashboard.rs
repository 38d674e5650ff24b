// src/bin/dashboard.rs
//
// Serves the dashboard without running the price checker.
// Usage: cargo run --bin dashboard

use ticket_price_tracker::config::DashboardConfig;
use ticket_price_tracker::services::price_history::PriceHistoryStore;
use ticket_price_tracker::{build_router, init_tracing, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = DashboardConfig::from_env()?;

    let app = build_router(AppState {
        store: PriceHistoryStore::new(config.price_file),
    });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("Dashboard listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
