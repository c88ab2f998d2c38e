use serde::{Deserialize, Serialize};

/// Point-in-time view of one pair, produced fresh on every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub fdv: f64,
    pub logo_url: Option<String>,
}

/// One recorded price, labelled with the local time of day it was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub label: String,
    pub price: f64,
}

impl PriceSample {
    pub fn new(label: impl Into<String>, price: f64) -> Self {
        Self {
            label: label.into(),
            price,
        }
    }
}
