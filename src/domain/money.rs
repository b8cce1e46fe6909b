use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

/// Money is an arbitrary-precision decimal, never a float.
pub type Amount = Decimal;

/// Format an amount with at least two decimal places, never rounding.
/// Example: 50 -> "50.00", 12.5 -> "12.50", 0.001 -> "0.001"
pub fn format_amount(amount: Amount) -> String {
    if amount.scale() >= 2 {
        amount.to_string()
    } else {
        format!("{:.2}", amount)
    }
}

/// Parse a decimal string into an amount.
/// Example: "50.00" -> 50.00, "12.5" -> 12.5, "100" -> 100
///
/// At most two fractional digits are accepted; anything finer is rejected
/// rather than silently truncated.
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseAmountError::InvalidFormat);
    }

    let amount = Decimal::from_str(input).map_err(|_| ParseAmountError::InvalidFormat)?;
    if amount.normalize().scale() > 2 {
        return Err(ParseAmountError::TooPrecise);
    }

    Ok(amount)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    InvalidFormat,
    TooPrecise,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::InvalidFormat => write!(f, "invalid money format"),
            ParseAmountError::TooPrecise => write!(f, "at most two decimal places are allowed"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
