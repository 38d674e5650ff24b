use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// True iff there is a previous price and `current` is strictly below it
pub fn has_dropped(current: Decimal, previous: Option<Decimal>) -> bool {
    match previous {
        Some(previous) => current < previous,
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceDrop {
    pub current: Decimal,
    pub previous: Decimal,
    pub amount: Decimal,
    pub percent: Decimal,
}

impl PriceDrop {
    pub fn between(current: Decimal, previous: Decimal) -> Option<Self> {
        if !has_dropped(current, Some(previous)) {
            return None;
        }

        let amount = previous - current;
        let percent = amount.checked_div(previous)? * dec!(100);

        Some(Self {
            current,
            previous,
            amount,
            percent,
        })
    }
}
