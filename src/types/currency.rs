//! Currency code type
//!
//! Currency codes are short text identifiers such as `USD` or `EUR`. They are
//! normalised to upper case on construction so `"eur"` and `"EUR"` refer to
//! the same rate table entry.

use super::error::BankError;
use std::fmt;
use std::str::FromStr;

/// Short alphabetic currency identifier, always upper case
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse a currency code
    ///
    /// Leading and trailing whitespace is ignored. The remaining text must be
    /// non-empty and consist of ASCII letters only.
    pub fn new(code: &str) -> Result<Self, BankError> {
        let trimmed = code.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(BankError::invalid_currency(code));
        }
        Ok(CurrencyCode(trimmed.to_ascii_uppercase()))
    }

    /// Build a code from a literal known to be valid
    pub(crate) fn from_static(code: &'static str) -> Self {
        debug_assert!(code.chars().all(|c| c.is_ascii_uppercase()));
        CurrencyCode(code.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = BankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CurrencyCode::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::upper("USD", "USD")]
    #[case::lower("eur", "EUR")]
    #[case::padded("  gbp ", "GBP")]
    fn test_valid_codes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(CurrencyCode::new(input).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    #[case::digits("US1")]
    #[case::symbol("$")]
    fn test_invalid_codes(#[case] input: &str) {
        assert_eq!(
            CurrencyCode::new(input).unwrap_err(),
            BankError::invalid_currency(input)
        );
    }

    #[test]
    fn test_parse_and_display() {
        let code: CurrencyCode = "chf".parse().unwrap();
        assert_eq!(code.to_string(), "CHF");
    }
}
