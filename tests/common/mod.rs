use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use ticket_price_tracker::error::{Result, TrackerError};
use ticket_price_tracker::scrapers::PriceSource;
use ticket_price_tracker::services::notifier::Notifier;
use ticket_price_tracker::services::price_history::PriceHistoryStore;
use uuid::Uuid;

/// Fresh store in the system temp dir; the file does not exist yet
pub fn temp_store() -> PriceHistoryStore {
    PriceHistoryStore::new(temp_path())
}

pub fn temp_path() -> PathBuf {
    std::env::temp_dir().join(format!("price_tracker_it_{}.json", Uuid::new_v4()))
}

pub fn cleanup_store(store: &PriceHistoryStore) {
    let _ = std::fs::remove_file(store.path());
}

/// Serves canned HTML pages through the real extractor, one per check
pub struct CannedPages {
    pages: Mutex<VecDeque<String>>,
}

impl CannedPages {
    pub fn new(pages: &[&str]) -> Self {
        Self {
            pages: Mutex::new(pages.iter().map(|p| p.to_string()).collect()),
        }
    }
}

#[async_trait]
impl PriceSource for CannedPages {
    async fn lowest_price(&self, _url: &str) -> Result<Decimal> {
        let page = self.pages.lock().unwrap().pop_front().unwrap_or_default();
        ticket_price_tracker::scrapers::parser::extract_price(&page).ok_or(TrackerError::PriceNotFound)
    }
}

#[derive(Default)]
pub struct OutboxNotifier {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn send_alert(&self, recipient: &str, subject: &str, body: &str) -> bool {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), subject.to_string(), body.to_string()));
        true
    }
}
