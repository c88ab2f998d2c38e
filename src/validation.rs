use crate::error::{Error, Result};

const MAX_ADDRESS_LENGTH: usize = 128;

/// Pair addresses end up in request paths, so only plain identifier
/// characters are accepted.
pub fn validate_pair_address(address: &str) -> Result<()> {
    if address.is_empty() {
        return Err(Error::InvalidInput("Pair address cannot be empty".to_string()));
    }
    if address.len() > MAX_ADDRESS_LENGTH {
        return Err(Error::InvalidInput("Pair address is too long".to_string()));
    }
    if !address.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(Error::InvalidInput(format!("Pair address contains invalid characters: {}", address)));
    }
    Ok(())
}

/// Parses an alert threshold. It must be a positive, finite number.
pub fn parse_price(raw: &str) -> Result<f64> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("Price is not a number: {}", raw)))?;
    if !price.is_finite() || price <= 0.0 {
        return Err(Error::InvalidInput(format!("Price must be positive: {}", raw)));
    }
    Ok(price)
}
