// src/lib.rs

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use services::price_history::PriceHistoryStore;

#[derive(Clone)]
pub struct AppState {
    pub store: PriceHistoryStore,
}

pub mod config;
pub mod error;
pub mod jobs;
pub mod scrapers;

pub mod models {
    pub mod dashboard;
    pub mod price_history;
}

pub mod services {
    pub mod drop_detector;
    pub mod notifier;
    pub mod price_history;
}

pub mod handlers {
    pub mod dashboard;
}

/// Dashboard routes. The dashboard only ever reads the store.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard::get_dashboard))
        .route("/api/prices", get(handlers::dashboard::get_prices))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Shared tracing setup for the binaries
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ticket_price_tracker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
