use std::fmt;

/// Money is represented as integer cents to avoid floating-point drift in sums.
/// 1 unit = 100 cents, so 50.00 = 5000 cents.
pub type Cents = i64;

/// Largest amount a single transaction may carry (10 trillion units).
/// Amounts are stored as JSON numbers, so every value up to this one
/// survives a write and read back exactly.
pub const MAX_AMOUNT_CENTS: Cents = 1_000_000_000_000_000;

/// Format cents as a human-readable amount.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Same as [`format_cents`] but always carries a sign, for signed subtotals.
/// Example: 5000 -> "+50.00", -1234 -> "-12.34", 0 -> "0.00"
pub fn format_signed_cents(cents: Cents) -> String {
    if cents > 0 {
        format!("+{}", format_cents(cents))
    } else {
        format_cents(cents)
    }
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000, "1.005" -> 101
///
/// Digits past the second decimal place round half away from zero.
/// Magnitudes above [`MAX_AMOUNT_CENTS`] are rejected as `Overflow`.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };

    let (units_str, decimal_str) = match digits.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (digits, ""),
    };

    if units_str.is_empty() && decimal_str.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }
    if !units_str.chars().all(|c| c.is_ascii_digit())
        || !decimal_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ParseCentsError::InvalidFormat);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| ParseCentsError::Overflow)?
    };

    let mut decimals = decimal_str.bytes().map(|b| i64::from(b - b'0'));
    let tenths = decimals.next().unwrap_or(0);
    let hundredths = decimals.next().unwrap_or(0);
    let round_up = decimals.next().is_some_and(|d| d >= 5);

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
        .filter(|c| *c <= MAX_AMOUNT_CENTS)
        .ok_or(ParseCentsError::Overflow)?;

    Ok(if negative { -cents } else { cents })
}

/// Convert a JSON-style floating amount into cents, rounding to the nearest cent.
/// Returns `None` for NaN, infinities and magnitudes above [`MAX_AMOUNT_CENTS`].
pub fn cents_from_f64(amount: f64) -> Option<Cents> {
    let scaled = (amount * 100.0).round();
    if !scaled.is_finite() || scaled.abs() > MAX_AMOUNT_CENTS as f64 {
        return None;
    }
    Some(scaled as Cents)
}

/// Convert cents into the floating amount written to JSON files.
pub fn cents_to_f64(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
    Overflow,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::Overflow => write!(
                f,
                "amount is too large (maximum {})",
                format_cents(MAX_AMOUNT_CENTS)
            ),
        }
    }
}

impl std::error::Error for ParseCentsError {}

/// Serde adapter storing [`Cents`] as a decimal number (`12.5`, `100.0`).
///
/// Use with `#[serde(with = "crate::domain::decimal_amount")]`.
pub mod decimal_amount {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{Cents, cents_from_f64, cents_to_f64};

    pub fn serialize<S: Serializer>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(cents_to_f64(*cents))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cents, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        cents_from_f64(amount)
            .ok_or_else(|| D::Error::custom(format!("amount {} is out of range", amount)))
    }
}
