use rust_decimal::Decimal;

use super::price_history::Observation;

/// Summary of one tracked URL shown on the dashboard page
#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub url: String,
    pub current_price: Decimal,
    pub lowest_price: Decimal,
    pub highest_price: Decimal,
    pub data_points: usize,
    pub history: Vec<Observation>,
}

impl DashboardStats {
    /// None when the history is empty
    pub fn from_history(url: String, history: Vec<Observation>) -> Option<Self> {
        let current_price = history.last()?.price;
        let lowest_price = history.iter().map(|o| o.price).min()?;
        let highest_price = history.iter().map(|o| o.price).max()?;

        Some(Self {
            url,
            current_price,
            lowest_price,
            highest_price,
            data_points: history.len(),
            history,
        })
    }
}
