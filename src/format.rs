//! Number formatting shared by the command replies.

/// Percentage distance of `price` from `threshold`.
pub fn deviation_pct(price: f64, threshold: f64) -> f64 {
    (price - threshold) / threshold * 100.0
}

/// Price in USD to six decimals, e.g. `$0.001234`.
pub fn usd_price(price: f64) -> String {
    format!("${:.6}", price)
}

/// Valuation in millions of USD to two decimals, e.g. `$5.00M`.
pub fn usd_millions(value: f64) -> String {
    format!("${:.2}M", value / 1e6)
}

/// Whole-number percentage; `signed` forces a leading `+` on non-negative values.
pub fn percent(pct: f64, signed: bool) -> String {
    if signed {
        format!("{:+.0}%", pct)
    } else {
        format!("{:.0}%", pct)
    }
}

/// Shortest round-tripping form of a threshold, always with a decimal point
/// or exponent (`3.0`, `0.0026`, `1e-5`).
pub fn threshold(value: f64) -> String {
    format!("{:?}", value)
}
