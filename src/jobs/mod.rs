pub mod price_check;
