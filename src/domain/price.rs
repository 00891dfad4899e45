//! Fixed-point dish prices with exactly two fraction digits.
//!
//! Prices are persisted as `NUMERIC(10, 2)` and travel over the wire as strings
//! such as `"13.50"`. Inputs with more than two fraction digits are rounded half
//! away from zero, the same way PostgreSQL coerces into the column type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::DomainError;

/// Largest value representable by `NUMERIC(10, 2)`, in cents.
const MAX_CENTS: i64 = 9_999_999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    cents: i64,
}

impl Price {
    pub fn from_cents(cents: i64) -> Result<Self, DomainError> {
        if cents < 0 {
            return Err(DomainError::validation("price must not be negative"));
        }
        if cents > MAX_CENTS {
            return Err(DomainError::validation("price exceeds supported range"));
        }
        Ok(Self { cents })
    }

    pub fn cents(self) -> i64 {
        self.cents
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl FromStr for Price {
    type Err = DomainError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.starts_with('-') {
            return Err(DomainError::validation("price must not be negative"));
        }
        let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(DomainError::validation(format!(
                "`{input}` is not a valid price"
            )));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(DomainError::validation(format!(
                "`{input}` is not a valid price"
            )));
        }

        let whole = whole.trim_start_matches('0');
        if whole.len() > 10 {
            return Err(DomainError::validation("price exceeds supported range"));
        }
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| DomainError::validation("price exceeds supported range"))?
        };

        let digits: Vec<i64> = fraction.bytes().map(|b| i64::from(b - b'0')).collect();
        let tenths = digits.first().copied().unwrap_or(0);
        let hundredths = digits.get(1).copied().unwrap_or(0);
        let round_up = digits.get(2).is_some_and(|digit| *digit >= 5);

        let cents = whole * 100 + tenths * 10 + hundredths + i64::from(round_up);
        Price::from_cents(cents)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Text(String),
    Number(f64),
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = match RawPrice::deserialize(deserializer)? {
            RawPrice::Text(text) => text,
            RawPrice::Number(number) if number.is_finite() => number.to_string(),
            RawPrice::Number(_) => {
                return Err(serde::de::Error::custom("price must be a finite number"));
            }
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_two_fraction_digits() {
        assert_eq!("13.5".parse::<Price>().unwrap().to_string(), "13.50");
        assert_eq!("12".parse::<Price>().unwrap().to_string(), "12.00");
        assert_eq!(".5".parse::<Price>().unwrap().to_string(), "0.50");
        assert_eq!("007.05".parse::<Price>().unwrap().to_string(), "7.05");
    }

    #[test]
    fn rounds_extra_digits_half_away_from_zero() {
        assert_eq!("1.005".parse::<Price>().unwrap().cents(), 101);
        assert_eq!("1.004".parse::<Price>().unwrap().cents(), 100);
        assert_eq!("0.999".parse::<Price>().unwrap().to_string(), "1.00");
    }

    #[test]
    fn rejects_garbage_and_negative_values() {
        assert!("".parse::<Price>().is_err());
        assert!(".".parse::<Price>().is_err());
        assert!("abc".parse::<Price>().is_err());
        assert!("1.2.3".parse::<Price>().is_err());
        assert!("-1.00".parse::<Price>().is_err());
        assert!("100000000.00".parse::<Price>().is_err());
    }

    #[test]
    fn accepts_json_strings_and_numbers() {
        let from_text: Price = serde_json::from_str("\"14.50\"").unwrap();
        let from_number: Price = serde_json::from_str("14.5").unwrap();
        assert_eq!(from_text, from_number);
        assert_eq!(serde_json::to_string(&from_text).unwrap(), "\"14.50\"");
    }
}
