use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use crate::scrapers::PriceSource;
use crate::services::drop_detector::PriceDrop;
use crate::services::notifier::{AlertMessage, Notifier};
use crate::services::price_history::PriceHistoryStore;

/// What a single check cycle did
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// No price could be fetched or extracted; the store was not touched
    ExtractionFailed,
    FirstObservation { price: Decimal },
    PriceDropped { drop: PriceDrop, alert_sent: bool },
    PriceUnchangedOrUp { current: Decimal, previous: Decimal },
}

pub struct PriceChecker {
    url: String,
    recipient: String,
    source: Arc<dyn PriceSource>,
    store: PriceHistoryStore,
    notifier: Arc<dyn Notifier>,
}

impl PriceChecker {
    pub fn new(
        url: String,
        recipient: String,
        source: Arc<dyn PriceSource>,
        store: PriceHistoryStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            url,
            recipient,
            source,
            store,
            notifier,
        }
    }

    /// One cycle: extract, compare with the last stored price, alert on a drop.
    /// Every successful extraction is stored, so the next comparison is always
    /// against this check rather than the lowest price ever seen.
    pub async fn check_price(&self) -> CheckOutcome {
        tracing::info!("Checking price for: {}", self.url);

        let current = match self.source.lowest_price(&self.url).await {
            Ok(price) if price > Decimal::ZERO => price,
            Ok(price) => {
                tracing::warn!("Ignoring non-positive price ${:.2}. Will try again next check.", price);
                return CheckOutcome::ExtractionFailed;
            }
            Err(e) => {
                tracing::warn!("Could not get current price ({}). Will try again next check.", e);
                return CheckOutcome::ExtractionFailed;
            }
        };

        let Some(previous) = self.store.last(&self.url).await else {
            tracing::info!("First check! Saving initial price: ${:.2}", current);
            self.record(current).await;
            return CheckOutcome::FirstObservation { price: current };
        };

        tracing::info!("Current price: ${:.2}, last price: ${:.2}", current, previous);

        let outcome = match PriceDrop::between(current, previous) {
            Some(drop) => {
                tracing::info!("Price dropped by ${:.2}!", drop.amount);

                let message = AlertMessage::price_drop(&self.url, &drop);
                let alert_sent = self
                    .notifier
                    .send_alert(&self.recipient, &message.subject, &message.body)
                    .await;

                CheckOutcome::PriceDropped { drop, alert_sent }
            }
            None => {
                tracing::info!("Price unchanged or increased. No alert needed.");
                CheckOutcome::PriceUnchangedOrUp { current, previous }
            }
        };

        self.record(current).await;
        outcome
    }

    async fn record(&self, price: Decimal) {
        if let Err(e) = self.store.append(&self.url, price).await {
            tracing::error!("Failed to save price for {}: {}", self.url, e);
        }
    }
}

pub fn start_price_check_job(checker: Arc<PriceChecker>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(run_price_checker(checker, period))
}

/// Check immediately, then once per `period` forever
pub async fn run_price_checker(checker: Arc<PriceChecker>, period: Duration) {
    tracing::info!("Running initial price check");
    checker.check_price().await;

    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tracing::info!(
            "Waiting {:.1} hours until next check...",
            period.as_secs_f64() / 3600.0
        );
        interval.tick().await;

        tracing::info!("Starting scheduled price check");
        checker.check_price().await;
    }
}
