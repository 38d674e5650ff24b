use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use rust_decimal::Decimal;
use std::time::Duration;

use super::parser::extract_price_with_strategy;
use super::{PriceSource, ScraperConfig};
use crate::error::{Result, TrackerError};

/// Fetches marketplace event pages with a browser-like header set
/// and runs the price heuristics over the result.
pub struct TicketScraper {
    client: Client,
    config: ScraperConfig,
}

impl TicketScraper {
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(browser_headers())
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, config })
    }

    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        tracing::info!("Fetching event page: {}", url);

        let response = self
            .client
            .get(url)
            .header(header::REFERER, self.config.referer.as_str())
            .send()
            .await?
            .error_for_status()?;

        let html = response.text().await?;
        tracing::debug!("Fetched {} bytes from {}", html.len(), url);

        Ok(html)
    }
}

#[async_trait]
impl PriceSource for TicketScraper {
    async fn lowest_price(&self, url: &str) -> Result<Decimal> {
        let html = self.fetch_page(url).await?;

        match extract_price_with_strategy(&html) {
            Some((price, strategy)) => {
                tracing::info!("Found price via {}: ${:.2}", strategy, price);
                Ok(price)
            }
            None => {
                tracing::warn!(
                    "Could not find a price on {}. The page structure may have changed, \
                    or the event may not have tickets available.",
                    url
                );
                Err(TrackerError::PriceNotFound)
            }
        }
    }
}

// Accept-Encoding is left to reqwest so responses are decompressed transparently
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(HeaderName::from_static("sec-fetch-dest"), HeaderValue::from_static("document"));
    headers.insert(HeaderName::from_static("sec-fetch-mode"), HeaderValue::from_static("navigate"));
    headers.insert(HeaderName::from_static("sec-fetch-site"), HeaderValue::from_static("none"));
    headers.insert(HeaderName::from_static("sec-fetch-user"), HeaderValue::from_static("?1"));
    headers
}
