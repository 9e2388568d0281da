//! Supporter fee value object.
//!
//! Money is held as an integer count of minor currency units (pence for
//! GBP) from the moment user input is parsed. No floating point value is
//! ever constructed, so the gateway amount is the fee by definition and
//! cannot drift.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A supporter fee in minor currency units (pence).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fee(i64);

impl Fee {
    /// Minimum supporter fee accepted on the application form (£10.00).
    ///
    /// Enforced at input validation, not at storage: historical rows with
    /// lower fees remain loadable.
    pub const MINIMUM: Fee = Fee(1000);

    /// Creates a fee from a pence amount.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NotPositive` if `pence <= 0`.
    pub fn from_pence(pence: i64) -> Result<Self, ValidationError> {
        if pence <= 0 {
            return Err(ValidationError::NotPositive {
                field: "fee",
                actual: pence,
            });
        }
        Ok(Self(pence))
    }

    /// Parses a decimal amount such as `"25"`, `"25.5"` or `"25.00"`.
    ///
    /// Accepts at most two decimal places. The conversion is exact
    /// integer arithmetic; `parse("10.25")` is precisely 1025 pence.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidFormat` for anything that is not
    /// a plain positive decimal, and `NotPositive` for zero.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ValidationError::empty_field("fee"));
        }

        let (whole, frac) = match input.split_once('.') {
            // a dot with nothing after it ("10.") is not an amount
            Some((_, "")) => {
                return Err(ValidationError::invalid_format(
                    "fee",
                    "trailing decimal point",
                ));
            }
            Some((w, f)) => (w, f),
            None => (input, ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::invalid_format("fee", "not a decimal amount"));
        }
        if frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::invalid_format(
                "fee",
                "at most two decimal places",
            ));
        }

        let pounds: i64 = whole
            .parse()
            .map_err(|_| ValidationError::invalid_format("fee", "amount too large"))?;
        let pence_frac: i64 = if frac.is_empty() {
            0
        } else {
            // "5" means 50p, "05" means 5p
            let parsed: i64 = frac
                .parse()
                .map_err(|_| ValidationError::invalid_format("fee", "bad decimal places"))?;
            if frac.len() == 1 {
                parsed * 10
            } else {
                parsed
            }
        };

        let pence = pounds
            .checked_mul(100)
            .and_then(|p| p.checked_add(pence_frac))
            .ok_or_else(|| ValidationError::invalid_format("fee", "amount too large"))?;

        Self::from_pence(pence)
    }

    /// Returns the fee in pence, the unit the gateway charges in.
    pub fn pence(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Fee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_two_decimal_amounts_exactly() {
        assert_eq!(Fee::parse("10.00").unwrap().pence(), 1000);
        assert_eq!(Fee::parse("10.25").unwrap().pence(), 1025);
        assert_eq!(Fee::parse("99.99").unwrap().pence(), 9999);
    }

    #[test]
    fn parses_short_forms() {
        assert_eq!(Fee::parse("25").unwrap().pence(), 2500);
        assert_eq!(Fee::parse("25.5").unwrap().pence(), 2550);
        assert_eq!(Fee::parse("25.05").unwrap().pence(), 2505);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Fee::parse("").is_err());
        assert!(Fee::parse("ten").is_err());
        assert!(Fee::parse("-5.00").is_err());
        assert!(Fee::parse("10.255").is_err());
        assert!(Fee::parse("10.").is_err());
        assert!(Fee::parse(".50").is_err());
    }

    #[test]
    fn rejects_zero() {
        assert!(Fee::parse("0").is_err());
        assert!(Fee::parse("0.00").is_err());
    }

    #[test]
    fn displays_with_two_decimal_places() {
        assert_eq!(Fee::parse("25").unwrap().to_string(), "25.00");
        assert_eq!(Fee::parse("10.5").unwrap().to_string(), "10.50");
        assert_eq!(Fee::parse("99.99").unwrap().to_string(), "99.99");
    }

    #[test]
    fn minimum_is_ten_pounds() {
        assert_eq!(Fee::MINIMUM.pence(), 1000);
        assert_eq!(Fee::MINIMUM.to_string(), "10.00");
    }

    proptest! {
        /// Any two-decimal monetary value converts to pence without drift.
        #[test]
        fn conversion_is_exact(pounds in 1i64..100_000, pence in 0i64..100) {
            let text = format!("{}.{:02}", pounds, pence);
            let fee = Fee::parse(&text).unwrap();
            prop_assert_eq!(fee.pence(), pounds * 100 + pence);
            prop_assert_eq!(fee.to_string(), text);
        }
    }
}
