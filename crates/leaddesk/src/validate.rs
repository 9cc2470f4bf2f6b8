use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

/// Returns `true` if `email` has a usable address syntax: a local part of
/// `[A-Za-z0-9._%+-]`, an `@`, domain labels, and a top-level domain of at
/// least two letters.
///
/// # Example
/// ```
/// use leaddesk::is_valid_email;
///
/// assert!(is_valid_email("jane.doe+leads@sales.example.com"));
/// assert!(!is_valid_email("not-an-email"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// A number as it arrives on the wire: either a JSON number or a numeric
/// string such as `"1000"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(serde_json::Number),
    Text(String),
}

impl NumericInput {
    /// Returns `true` for an empty or whitespace-only string.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(text) => text.trim().is_empty(),
        }
    }

    /// Parses the value as a finite number.
    pub fn as_finite_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(number) => number.as_f64()?,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Parses the value as a whole amount.
    ///
    /// The value must first read as a finite number: a JSON number, or a
    /// string holding a decimal literal (`"12.5"`, `"1e3"`) or a `0x`, `0o`
    /// or `0b` integer literal. The amount is then the leading integer of the
    /// text, the way a lenient `parse_int` reads it: an optional sign,
    /// base 16 after a `0x` prefix, and digits up to the first non-digit.
    /// So `"12.9"` is `12`, `"1e3"` is `1` and `"0x10"` is `16`. JSON numbers
    /// that are not integers keep their integer part.
    ///
    /// Returns `None` for non-numeric input and for values outside the `i64`
    /// range.
    pub fn to_amount(&self) -> Option<i64> {
        match self {
            Self::Number(number) => number.as_i64().or_else(|| {
                let truncated = number.as_f64()?.trunc();
                // i64::MAX is not representable as f64; the upper bound is exclusive.
                ((i64::MIN as f64)..(i64::MAX as f64))
                    .contains(&truncated)
                    .then_some(truncated as i64)
            }),
            Self::Text(text) => {
                numeric_literal(text.trim())?;
                leading_integer(text)
            }
        }
    }

    /// Parses the value as a non-negative integer, such as a page offset.
    pub fn to_index(&self) -> Option<u64> {
        match self {
            Self::Number(number) => number.as_u64(),
            Self::Text(text) => text.trim().parse::<u64>().ok(),
        }
    }

    /// The value rendered back as text, for error messages and sort codes.
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.trim().to_owned(),
        }
    }
}

/// Reads `text` as a finite numeric literal.
fn numeric_literal(text: &str) -> Option<f64> {
    let radix = match text.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&text[2..], radix).ok().map(|v| v as f64);
    }

    // `f64::from_str` also takes "inf" and "NaN", which are not amounts.
    let decimal = text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    let value = text.parse::<f64>().ok().filter(|_| decimal)?;
    value.is_finite().then_some(value)
}

/// The integer at the start of `text`, after leading whitespace and an
/// optional sign. A `0x` prefix switches to base 16. Parsing stops at the
/// first character that is not a digit in that base.
fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = match rest.get(..2) {
        Some("0x" | "0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = i128::from_str_radix(&digits[..end], radix).ok()?;
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

impl From<&str> for NumericInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for NumericInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i64> for NumericInput {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for NumericInput {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_addresses() {
        for email in [
            "a@b.co",
            "first.last@example.com",
            "user+tag@sub.domain.org",
            "under_score%x@host-name.io",
        ] {
            assert!(is_valid_email(email), "{email} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in [
            "",
            "not-an-email",
            "@example.com",
            "user@",
            "user@example",
            "user@example.c",
            "user@example.c0m",
            "user name@example.com",
            "user@example.com ",
        ] {
            assert!(!is_valid_email(email), "{email:?} should be invalid");
        }
    }

    #[test]
    fn amounts_parse_from_numbers_and_strings() {
        assert_eq!(NumericInput::from("1000").to_amount(), Some(1000));
        assert_eq!(NumericInput::from(" 42 ").to_amount(), Some(42));
        assert_eq!(NumericInput::from("12.9").to_amount(), Some(12));
        assert_eq!(NumericInput::from("-3.5").to_amount(), Some(-3));
        assert_eq!(NumericInput::from("+7").to_amount(), Some(7));
        assert_eq!(NumericInput::from(".5").to_amount(), None);
        assert_eq!(NumericInput::from(250_i64).to_amount(), Some(250));
        assert_eq!(NumericInput::from(i64::MAX).to_amount(), Some(i64::MAX));

        let fractional: NumericInput = serde_json::from_str("99.99").unwrap();
        assert_eq!(fractional.to_amount(), Some(99));
    }

    #[test]
    fn amounts_stop_at_the_first_non_digit() {
        assert_eq!(NumericInput::from("1e3").to_amount(), Some(1));
        assert_eq!(NumericInput::from("2.5E2").to_amount(), Some(2));
        assert_eq!(NumericInput::from("-1e3").to_amount(), Some(-1));
        assert_eq!(NumericInput::from("1e400").to_amount(), None);
    }

    #[test]
    fn amounts_read_hex_literals() {
        assert_eq!(NumericInput::from("0x10").to_amount(), Some(16));
        assert_eq!(NumericInput::from("0XfF").to_amount(), Some(255));
        assert_eq!(NumericInput::from("0x").to_amount(), None);
        // Octal and binary literals are numbers, but only their leading zero
        // is an integer.
        assert_eq!(NumericInput::from("0o17").to_amount(), Some(0));
        assert_eq!(NumericInput::from("0b11").to_amount(), Some(0));
    }

    #[test]
    fn amounts_reject_non_numbers() {
        for text in [
            "abc",
            "12abc",
            "NaN",
            "inf",
            "Infinity",
            "-infinity",
            "0x1g",
            "1-2",
            "99999999999999999999",
        ] {
            assert_eq!(NumericInput::from(text).to_amount(), None, "{text}");
        }
    }

    #[test]
    fn indexes_must_be_non_negative_integers() {
        assert_eq!(NumericInput::from("3").to_index(), Some(3));
        assert_eq!(NumericInput::from(7_u64).to_index(), Some(7));
        assert_eq!(NumericInput::from("-1").to_index(), None);
        assert_eq!(NumericInput::from(-1_i64).to_index(), None);
        assert_eq!(NumericInput::from("1.5").to_index(), None);
    }

    #[test]
    fn deserializes_either_shape() {
        let number: NumericInput = serde_json::from_str("10").unwrap();
        let text: NumericInput = serde_json::from_str("\"10\"").unwrap();
        assert_eq!(number.to_amount(), text.to_amount());
        assert!(NumericInput::from("  ").is_blank());
        assert!(!number.is_blank());
    }
}
