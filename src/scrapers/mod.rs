pub mod parser;
pub mod ticket_page;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::Result;

/// Anything that can report the current lowest price for an event URL
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn lowest_price(&self, url: &str) -> Result<Decimal>;
}

#[derive(Clone)]
pub struct ScraperConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub referer: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            referer: "https://www.google.com/".to_string(),
        }
    }
}
