use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Amounts outside [MIN_SANE_PRICE, MAX_SANE_PRICE] are treated as noise
/// (fees, row numbers, unrelated dollar figures).
pub const MIN_SANE_PRICE: Decimal = dec!(10);
pub const MAX_SANE_PRICE: Decimal = dec!(10000);

lazy_static! {
    // "Tickets start at $84" / "start at 84.50"
    static ref START_AT_REGEX: Regex =
        Regex::new(r"(?i)(?:tickets\s+)?start\s+at\s+\$?([\d,]+\.?\d*)").unwrap();

    // FAQ style: "What is the lowest price? ... $62"
    static ref LOWEST_PRICE_REGEX: Regex =
        Regex::new(r"(?i)lowest\s+price[^$]*\$?([\d,]+\.?\d*)").unwrap();

    // First number inside a price element, dollar sign optional
    static ref AMOUNT_REGEX: Regex = Regex::new(r"\$?([\d,]+\.?\d*)").unwrap();

    static ref DOLLAR_AMOUNT_REGEX: Regex = Regex::new(r"\$([\d,]+\.?\d*)").unwrap();
}

/// Which heuristic produced the price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    StartsAt,
    LowestPriceText,
    StructuredData,
    PriceElements,
    PageMinimum,
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExtractionStrategy::StartsAt => "'start at' text",
            ExtractionStrategy::LowestPriceText => "'lowest price' text",
            ExtractionStrategy::StructuredData => "structured data",
            ExtractionStrategy::PriceElements => "price elements",
            ExtractionStrategy::PageMinimum => "lowest price from all prices on page",
        };
        write!(f, "{}", name)
    }
}

/// Extract the lowest ticket price from an event page
pub fn extract_price(html: &str) -> Option<Decimal> {
    extract_price_with_strategy(html).map(|(price, _)| price)
}

/// Tries each strategy in order, specific to general, and stops at the first hit
pub fn extract_price_with_strategy(html: &str) -> Option<(Decimal, ExtractionStrategy)> {
    let document = Html::parse_document(html);
    let page_text = visible_text(&document);

    // 1. "tickets start at $X"
    if let Some(price) = first_capture(&START_AT_REGEX, &page_text) {
        return Some((price, ExtractionStrategy::StartsAt));
    }

    // 2. "lowest price ... $X"
    if let Some(price) = first_capture(&LOWEST_PRICE_REGEX, &page_text) {
        return Some((price, ExtractionStrategy::LowestPriceText));
    }

    // 3. JSON-LD offers
    if let Some(price) = structured_data_price(&document) {
        return Some((price, ExtractionStrategy::StructuredData));
    }

    // 4. Elements tagged as prices
    if let Some(price) = price_element_minimum(&document) {
        return Some((price, ExtractionStrategy::PriceElements));
    }

    // 5. Every dollar amount on the page
    page_minimum(&page_text).map(|price| (price, ExtractionStrategy::PageMinimum))
}

/// Text a visitor would see: everything except script, style and template bodies
fn visible_text(document: &Html) -> String {
    let mut text = String::new();

    for node in document.root_element().descendants() {
        let Some(chunk) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|element| matches!(element.name(), "script" | "style" | "template"))
                .unwrap_or(false)
        });
        if !hidden {
            text.push_str(chunk);
        }
    }

    text
}

// Zero or negative amounts are never a ticket price
fn first_capture(regex: &Regex, text: &str) -> Option<Decimal> {
    regex
        .captures(text)
        .and_then(|cap| cap.get(1))
        .and_then(|m| parse_amount(m.as_str()))
        .filter(|amount| *amount > Decimal::ZERO)
}

fn structured_data_price(document: &Html) -> Option<Decimal> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;

    document.select(&selector).find_map(|script| {
        let raw: String = script.text().collect();
        let data: Value = serde_json::from_str(&raw).ok()?;
        offer_price(&data)
    })
}

/// `offers` may be a single offer or a list; only the first listed offer is read
fn offer_price(data: &Value) -> Option<Decimal> {
    let offer = match data.get("offers")? {
        Value::Array(offers) => offers.first()?,
        offer @ Value::Object(_) => offer,
        _ => return None,
    };

    let price = match offer.get("price")? {
        Value::String(raw) => parse_amount(raw)?,
        Value::Number(number) => {
            let raw = number.to_string();
            Decimal::from_str(&raw)
                .or_else(|_| Decimal::from_scientific(&raw))
                .ok()?
        }
        _ => return None,
    };

    (price > Decimal::ZERO).then_some(price)
}

fn price_element_minimum(document: &Html) -> Option<Decimal> {
    let selector = Selector::parse("span, div, p").ok()?;

    document
        .select(&selector)
        .filter(is_price_element)
        .filter_map(|element| {
            let text: String = element.text().collect::<String>().replace(',', "");
            let amount = first_capture(&AMOUNT_REGEX, &text)?;
            in_sanity_window(amount).then_some(amount)
        })
        .min()
}

fn is_price_element(element: &ElementRef) -> bool {
    let attr_contains = |name: &str, needles: &[&str]| {
        element
            .value()
            .attr(name)
            .map(|value| {
                let value = value.to_lowercase();
                needles.iter().any(|needle| value.contains(needle))
            })
            .unwrap_or(false)
    };

    attr_contains("class", &["price", "lowest", "cost"]) || attr_contains("data-testid", &["price"])
}

fn page_minimum(page_text: &str) -> Option<Decimal> {
    DOLLAR_AMOUNT_REGEX
        .captures_iter(page_text)
        .filter_map(|cap| parse_amount(&cap[1]))
        .filter(|amount| in_sanity_window(*amount))
        .min()
}

pub fn in_sanity_window(amount: Decimal) -> bool {
    (MIN_SANE_PRICE..=MAX_SANE_PRICE).contains(&amount)
}

/// Parse "1,250.00" / "84." style amounts; None for tokens with no digits
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned = raw.replace(',', "");
    let cleaned = cleaned.trim().trim_end_matches('.');
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(cleaned).ok()
}
