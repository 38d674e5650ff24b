use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// Fetching the event page failed (connect, timeout, non-2xx status)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// None of the extraction strategies found a price on the page
    #[error("No price found on page")]
    PriceNotFound,

    #[error("Invalid price: {0}")]
    InvalidPrice(rust_decimal::Decimal),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Email build error: {0}")]
    Email(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Missing required configuration: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    #[error("Invalid value for {name}: '{value}'")]
    InvalidConfig { name: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, TrackerError>;
