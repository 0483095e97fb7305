//! Human-readable amounts on the command line

use alloy_primitives::{utils::parse_ether, U256};

use crate::error::ValidationError;

/// Parse `"0.01ether"` as ether units or a bare integer as base units
pub fn parse_amount(input: &str) -> Result<U256, ValidationError> {
    let input = input.trim();
    let invalid = |reason: String| ValidationError::InvalidAmount(format!("{}: {}", input, reason));

    match input.strip_suffix("ether") {
        Some(ether) => parse_ether(ether.trim()).map_err(|e| invalid(e.to_string())),
        None => input.parse::<U256>().map_err(|e| invalid(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ether_units() {
        assert_eq!(parse_amount("1ether").unwrap(), U256::from(10u64.pow(18)));
        assert_eq!(parse_amount("0.01ether").unwrap(), U256::from(10u64.pow(16)));
        assert_eq!(parse_amount("0.5 ether").unwrap(), U256::from(5 * 10u64.pow(17)));
    }

    #[test]
    fn test_parse_base_units() {
        assert_eq!(parse_amount("12345").unwrap(), U256::from(12_345u64));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_amount("ten"), Err(ValidationError::InvalidAmount(_))));
        assert!(parse_amount("1.5").is_err());
    }
}
