use std::sync::Arc;

use ticket_price_tracker::config::Config;
use ticket_price_tracker::jobs::price_check::{run_price_checker, start_price_check_job, PriceChecker};
use ticket_price_tracker::scrapers::{ticket_page::TicketScraper, ScraperConfig};
use ticket_price_tracker::services::{notifier::EmailNotifier, price_history::PriceHistoryStore};
use ticket_price_tracker::{build_router, init_tracing, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();
    tracing::info!("Ticket Price Tracker starting");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            tracing::error!("Please fix your configuration (environment or .env file) and try again.");
            std::process::exit(1);
        }
    };

    tracing::info!("Event URL: {}", config.event_url);
    tracing::info!("Alert email: {}", config.my_email);
    tracing::info!("Check interval: {} hours", config.check_interval_hours);

    let store = PriceHistoryStore::new(config.dashboard.price_file.clone());
    let scraper = TicketScraper::new(ScraperConfig::default())?;
    let notifier = EmailNotifier::new(&config.smtp)?;

    let checker = Arc::new(PriceChecker::new(
        config.event_url.clone(),
        config.my_email.clone(),
        Arc::new(scraper),
        store.clone(),
        Arc::new(notifier),
    ));
    let period = config.check_interval;

    if config.enable_dashboard {
        tracing::info!("Starting price checker in background...");
        start_price_check_job(checker, period);

        let app = build_router(AppState { store });

        let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.dashboard.port)).await?;
        tracing::info!("Dashboard listening on {}", listener.local_addr()?);

        axum::serve(listener, app).await?;
    } else {
        tracing::info!("Starting price monitoring (no dashboard). Press Ctrl+C to stop");

        tokio::select! {
            _ = run_price_checker(checker, period) => {
                tracing::error!("Price checker stopped unexpectedly. Restart to continue monitoring.");
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping price tracker. Goodbye!");
            }
        }
    }

    Ok(())
}
