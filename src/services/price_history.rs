use chrono::{Local, SubsecRound};
use rust_decimal::Decimal;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, TrackerError};
use crate::models::price_history::{Observation, PriceHistory};

/// Price history kept in a single JSON document.
///
/// Every operation reloads the whole document from disk and every write
/// rewrites it in full, so the file is the only source of truth shared
/// between the checker and the dashboard. There is no locking.
#[derive(Debug, Clone)]
pub struct PriceHistoryStore {
    path: PathBuf,
}

impl PriceHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing, unreadable or corrupt documents load as an empty history
    async fn load(&self) -> PriceHistory {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return PriceHistory::new(),
            Err(e) => {
                tracing::warn!("Error reading price file {}: {}", self.path.display(), e);
                return PriceHistory::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(
                    "Price file {} is corrupt, treating as empty: {}",
                    self.path.display(),
                    e
                );
                PriceHistory::new()
            }
        }
    }

    async fn save(&self, data: &PriceHistory) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Record `price` for `url` stamped with the current local time
    pub async fn append(&self, url: &str, price: Decimal) -> Result<Observation> {
        if price <= Decimal::ZERO {
            return Err(TrackerError::InvalidPrice(price));
        }

        let mut data = self.load().await;

        let observation = Observation {
            price,
            timestamp: Local::now().naive_local().trunc_subsecs(6),
        };
        data.entry(url.to_string())
            .or_default()
            .push(observation.clone());

        self.save(&data).await?;
        tracing::info!("Saved price ${:.2} for {}", price, url);

        Ok(observation)
    }

    /// Price of the most recent observation
    pub async fn last(&self, url: &str) -> Option<Decimal> {
        self.load()
            .await
            .get(url)
            .and_then(|history| history.last())
            .map(|observation| observation.price)
    }

    pub async fn all(&self, url: &str) -> Vec<Observation> {
        self.load().await.shift_remove(url).unwrap_or_default()
    }

    pub async fn urls(&self) -> Vec<String> {
        self.load().await.into_keys().collect()
    }

    pub async fn snapshot(&self) -> PriceHistory {
        self.load().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    const URL: &str = "https://www.vividseats.com/event/123";

    fn temp_store() -> PriceHistoryStore {
        PriceHistoryStore::new(
            std::env::temp_dir().join(format!("price_history_{}.json", Uuid::new_v4())),
        )
    }

    fn cleanup(store: &PriceHistoryStore) {
        let _ = std::fs::remove_file(store.path());
    }

    #[tokio::test]
    async fn test_append_then_all_preserves_order() {
        let store = temp_store();
        let prices = [dec!(120), dec!(95.50), dec!(130), dec!(95.50), dec!(88)];

        for price in prices {
            store.append(URL, price).await.unwrap();
        }

        let history = store.all(URL).await;
        assert_eq!(history.len(), prices.len());
        assert_eq!(
            history.iter().map(|o| o.price).collect::<Vec<_>>(),
            prices.to_vec()
        );
        assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

        cleanup(&store);
    }

    #[tokio::test]
    async fn test_last_on_untracked_url() {
        let store = temp_store();

        assert_eq!(store.last(URL).await, None);
        assert!(store.all(URL).await.is_empty());
        assert!(store.urls().await.is_empty());
    }

    #[tokio::test]
    async fn test_last_returns_most_recent() {
        let store = temp_store();
        store.append(URL, dec!(100)).await.unwrap();
        store.append(URL, dec!(80)).await.unwrap();
        store.append("https://example.com/other", dec!(300)).await.unwrap();

        assert_eq!(store.last(URL).await, Some(dec!(80)));
        assert_eq!(
            store.urls().await,
            vec![URL.to_string(), "https://example.com/other".to_string()]
        );

        cleanup(&store);
    }

    #[tokio::test]
    async fn test_corrupt_document_reads_as_empty() {
        let store = temp_store();
        std::fs::write(store.path(), "{ this is not json").unwrap();

        assert_eq!(store.last(URL).await, None);
        assert!(store.all(URL).await.is_empty());
        assert!(store.urls().await.is_empty());

        // Next write replaces the corrupt document
        store.append(URL, dec!(64)).await.unwrap();
        assert_eq!(store.all(URL).await.len(), 1);

        cleanup(&store);
    }

    #[tokio::test]
    async fn test_reads_existing_document_format() {
        let store = temp_store();
        std::fs::write(
            store.path(),
            r#"{
  "https://www.vividseats.com/event/123": [
    {"price": 84.5, "timestamp": "2025-01-02T03:04:05.123456"},
    {"price": 79, "timestamp": "2025-01-02T07:04:05.654321"}
  ]
}"#,
        )
        .unwrap();

        let history = store.all(URL).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].price, dec!(84.5));
        assert_eq!(store.last(URL).await, Some(dec!(79)));

        cleanup(&store);
    }

    #[tokio::test]
    async fn test_document_is_rewritten_in_full() {
        let store = temp_store();
        store.append(URL, dec!(100)).await.unwrap();
        store.append(URL, dec!(90.25)).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entries = json[URL].as_array().unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1]["price"].as_f64(), Some(90.25));
        assert!(entries[1]["timestamp"].is_string());

        cleanup(&store);
    }

    #[tokio::test]
    async fn test_urls_keep_insertion_order() {
        let store = temp_store();
        std::fs::write(
            store.path(),
            r#"{
  "https://z.example/first": [{"price": 50, "timestamp": "2025-01-02T03:04:05.000001"}],
  "https://a.example/second": [{"price": 60, "timestamp": "2025-01-02T03:04:06.000001"}]
}"#,
        )
        .unwrap();

        let expected = vec![
            "https://z.example/first".to_string(),
            "https://a.example/second".to_string(),
        ];
        assert_eq!(store.urls().await, expected);

        store.append("https://a.example/second", dec!(55)).await.unwrap();
        store.append("https://m.example/third", dec!(70)).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let first = raw.find("https://z.example/first").unwrap();
        let second = raw.find("https://a.example/second").unwrap();
        let third = raw.find("https://m.example/third").unwrap();
        assert!(first < second && second < third);

        cleanup(&store);
    }

    #[tokio::test]
    async fn test_appended_observation_matches_stored() {
        let store = temp_store();
        let observation = store.append(URL, dec!(84.5)).await.unwrap();

        assert_eq!(store.all(URL).await, vec![observation]);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let timestamp = json[URL][0]["timestamp"].as_str().unwrap();
        assert_eq!(timestamp.len(), 26);
        assert_eq!(timestamp.as_bytes()[19], b'.');

        cleanup(&store);
    }

    #[tokio::test]
    async fn test_non_positive_price_rejected() {
        let store = temp_store();

        let result = store.append(URL, dec!(0)).await;
        assert!(matches!(result, Err(TrackerError::InvalidPrice(_))));
        assert!(store.all(URL).await.is_empty());
    }
}
