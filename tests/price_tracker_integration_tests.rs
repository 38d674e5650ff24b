mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::Value;
use std::sync::Arc;
use ticket_price_tracker::jobs::price_check::{CheckOutcome, PriceChecker};
use ticket_price_tracker::services::price_history::PriceHistoryStore;
use ticket_price_tracker::{build_router, AppState};
use tower::ServiceExt;

use crate::common::{cleanup_store, temp_path, temp_store, CannedPages, OutboxNotifier};

const EVENT_URL: &str = "https://www.vividseats.com/taylor-swift-tickets/event/4242";
const RECIPIENT: &str = "fan@example.com";

const PAGE_AT_100: &str = r#"<html><body>
    <h1>Taylor Swift | The Eras Tour</h1>
    <p>Tickets start at $100.00 for this event.</p>
</body></html>"#;

const PAGE_AT_80: &str = r#"<html><head>
    <script type="application/ld+json">{"@type":"MusicEvent","offers":[{"price":"80.00","priceCurrency":"USD"}]}</script>
</head><body><span class="listing-price">$95</span></body></html>"#;

const PAGE_WITHOUT_PRICE: &str = "<html><body><h1>Access denied</h1></body></html>";

fn checker(
    store: &PriceHistoryStore,
    pages: &[&str],
    notifier: Arc<OutboxNotifier>,
) -> PriceChecker {
    PriceChecker::new(
        EVENT_URL.to_string(),
        RECIPIENT.to_string(),
        Arc::new(CannedPages::new(pages)),
        store.clone(),
        notifier,
    )
}

async fn get_json(store: &PriceHistoryStore, uri: &str) -> Value {
    let response = build_router(AppState {
        store: store.clone(),
    })
    .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// First check at $100 stores one observation quietly; second at $80 alerts once
#[tokio::test]
async fn test_drop_alert_end_to_end() {
    let store = temp_store();
    let notifier = Arc::new(OutboxNotifier::default());
    let checker = checker(&store, &[PAGE_AT_100, PAGE_AT_80], notifier.clone());

    assert_eq!(
        checker.check_price().await,
        CheckOutcome::FirstObservation { price: dec!(100) }
    );
    assert_eq!(store.all(EVENT_URL).await.len(), 1);
    assert!(notifier.sent.lock().unwrap().is_empty());

    let outcome = checker.check_price().await;
    assert!(matches!(
        outcome,
        CheckOutcome::PriceDropped { alert_sent: true, .. }
    ));

    {
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (recipient, subject, body) = &sent[0];
        assert_eq!(recipient, RECIPIENT);
        assert_eq!(subject, "🎵 Ticket Price Drop Alert! Save $20.00 🎵");
        assert!(body.contains("Current price: $80.00"));
        assert!(body.contains("Previous price: $100.00"));
        assert!(body.contains("You save: $20.00 (20.0%)"));
        assert!(body.ends_with(EVENT_URL));
    }

    let history = store.all(EVENT_URL).await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].price, dec!(80));

    // The dashboard API sees what the checker wrote
    let json = get_json(&store, "/api/prices").await;
    let prices: Vec<f64> = json[EVENT_URL]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["price"].as_f64().unwrap())
        .collect();
    assert_eq!(prices, vec![100.0, 80.0]);

    cleanup_store(&store);
}

#[tokio::test]
async fn test_failed_extraction_is_retried_next_cycle() {
    let store = temp_store();
    let notifier = Arc::new(OutboxNotifier::default());
    let checker = checker(&store, &[PAGE_WITHOUT_PRICE, PAGE_AT_100], notifier.clone());

    assert_eq!(checker.check_price().await, CheckOutcome::ExtractionFailed);
    assert!(store.urls().await.is_empty());

    assert_eq!(
        checker.check_price().await,
        CheckOutcome::FirstObservation { price: dec!(100) }
    );
    assert!(notifier.sent.lock().unwrap().is_empty());

    cleanup_store(&store);
}

#[tokio::test]
async fn test_corrupt_store_recovers_as_first_observation() {
    let path = temp_path();
    std::fs::write(&path, "[[[ not a price document").unwrap();
    let store = PriceHistoryStore::new(path);

    let json = get_json(&store, "/api/prices").await;
    assert_eq!(json, serde_json::json!({}));

    let notifier = Arc::new(OutboxNotifier::default());
    let checker = checker(&store, &[PAGE_AT_80], notifier.clone());

    assert_eq!(
        checker.check_price().await,
        CheckOutcome::FirstObservation { price: dec!(80) }
    );
    assert!(notifier.sent.lock().unwrap().is_empty());

    let json = get_json(&store, "/api/prices").await;
    assert_eq!(json[EVENT_URL].as_array().unwrap().len(), 1);

    cleanup_store(&store);
}
