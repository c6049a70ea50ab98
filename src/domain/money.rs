use std::fmt;

/// Money is represented as an integer count of the currency's smallest unit.
/// IDR has no minor unit in practice, so 10000 means Rp 10.000.
pub type Amount = i64;

/// Currency sent to the payout partner when the caller leaves it blank.
pub const DEFAULT_CURRENCY: &str = "IDR";

/// Format an amount with `.` as the thousands separator.
/// Example: 10000 -> "10.000", -1234567 -> "-1.234.567"
pub fn format_amount(amount: Amount) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let digits = amount.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}{}", sign, grouped)
}

/// Parse a non-negative whole amount.
/// Accepts `_` and `.` as digit separators, so "10000", "10_000" and "10.000"
/// all parse to 10000.
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim();
    if input.starts_with('-') {
        return Err(ParseAmountError::Negative);
    }

    let digits: String = input.chars().filter(|c| *c != '_' && *c != '.').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseAmountError::InvalidFormat);
    }

    digits.parse().map_err(|_| ParseAmountError::Overflow)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    InvalidFormat,
    Negative,
    Overflow,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::InvalidFormat => write!(f, "invalid amount format"),
            ParseAmountError::Negative => write!(f, "amount cannot be negative"),
            ParseAmountError::Overflow => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
