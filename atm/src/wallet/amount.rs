//! Parsing of user-entered amounts.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::U256;
use alloy::primitives::utils::parse_ether;

use crate::error::WalletError;

/// 0.01 ETH in wei: the slider's lower bound and step.
const STEP_WEI: u128 = 10_000_000_000_000_000;
/// 10 ETH in wei: the slider's upper bound.
const MAX_WEI: u128 = 10_000_000_000_000_000_000;

/// Parse the leading integer of a form field.
///
/// Leading whitespace and a single sign are accepted, then the longest run
/// of ASCII digits is read and anything after it is ignored, so `"12.7"`
/// parses as 12 and `"1e3"` as 1.
///
/// # Errors
///
/// Returns [`WalletError::InvalidAmount`] if no digits follow, the value is
/// negative, or it does not fit in 256 bits.
pub fn parse_int_prefix(input: &str) -> Result<U256, WalletError> {
    let invalid = || WalletError::InvalidAmount(input.to_string());

    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return Err(invalid());
    }

    let value = U256::from_str_radix(digits, 10).map_err(|_| invalid())?;
    if negative && !value.is_zero() {
        return Err(invalid());
    }
    Ok(value)
}

/// The transfer slider value: an ETH amount in [0.01, 10] in steps of 0.01.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferAmount {
    text: String,
    wei: U256,
}

impl TransferAmount {
    /// Smallest accepted amount.
    pub const MIN: &'static str = "0.01";
    /// Largest accepted amount.
    pub const MAX: &'static str = "10";
    /// Slider step.
    pub const STEP: &'static str = "0.01";

    /// Parse an ETH amount, enforcing the slider bounds and step.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::InvalidAmount`] if the text is not a decimal
    /// ETH amount, lies outside [0.01, 10], or is not a multiple of 0.01.
    pub fn parse(text: &str) -> Result<Self, WalletError> {
        let text = text.trim();
        let invalid = || WalletError::InvalidAmount(text.to_string());

        // parse_ether yields the absolute value of negative input
        if text.starts_with('-') {
            return Err(invalid());
        }
        let wei = parse_ether(text).map_err(|_| invalid())?;
        let step = U256::from(STEP_WEI);
        if wei < step || wei > U256::from(MAX_WEI) || !(wei % step).is_zero() {
            return Err(invalid());
        }

        Ok(Self {
            text: text.to_string(),
            wei,
        })
    }

    /// The amount as entered, in ETH.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The amount in wei.
    #[must_use]
    pub const fn wei(&self) -> U256 {
        self.wei
    }
}

impl Default for TransferAmount {
    /// The slider's lower bound, 0.01 ETH.
    fn default() -> Self {
        Self {
            text: Self::MIN.to_string(),
            wei: U256::from(STEP_WEI),
        }
    }
}

impl FromStr for TransferAmount {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TransferAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("1000").unwrap(), U256::from(1000));
        assert_eq!(parse_int_prefix("  42").unwrap(), U256::from(42));
        assert_eq!(parse_int_prefix("+7").unwrap(), U256::from(7));
        assert_eq!(parse_int_prefix("12.7").unwrap(), U256::from(12));
        assert_eq!(parse_int_prefix("1e3").unwrap(), U256::from(1));
        assert_eq!(parse_int_prefix("-0").unwrap(), U256::ZERO);
    }

    #[test]
    fn test_parse_int_prefix_rejects() {
        assert!(parse_int_prefix("").is_err());
        assert!(parse_int_prefix("abc").is_err());
        assert!(parse_int_prefix("-5").is_err());
        assert!(parse_int_prefix("- 5").is_err());
        let too_big = "9".repeat(100);
        assert!(parse_int_prefix(&too_big).is_err());
    }

    #[test]
    fn test_transfer_amount_bounds() {
        let min = TransferAmount::parse(TransferAmount::MIN).unwrap();
        assert_eq!(min.wei(), U256::from(STEP_WEI));
        assert_eq!(min.to_string(), "0.01");

        let max = TransferAmount::parse(TransferAmount::MAX).unwrap();
        assert_eq!(max.wei(), U256::from(MAX_WEI));

        assert_eq!(TransferAmount::default(), min);

        let mid: TransferAmount = "2.35".parse().unwrap();
        assert_eq!(mid.as_str(), "2.35");
    }

    #[test]
    fn test_transfer_amount_rejects() {
        assert!(TransferAmount::parse("0").is_err());
        assert!(TransferAmount::parse("0.001").is_err());
        assert!(TransferAmount::parse("10.01").is_err());
        assert!(TransferAmount::parse("1.005").is_err());
        assert!(TransferAmount::parse("-1").is_err());
        assert!(TransferAmount::parse("one").is_err());
    }
}
