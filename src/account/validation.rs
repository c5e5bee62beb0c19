//! Input validation for currency codes
//!
//! `CurrencyCode` keeps its field private so every instance went through
//! `new()`.

use std::fmt;

/// Validation errors for user-supplied names and codes
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("Currency must be uppercase: got '{got}', expected '{expected}'")]
    CurrencyNotUppercase { got: String, expected: String },

    #[error("Invalid length for {field}: expected {expected}, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid format for {field}: '{value}' (expected: {expected})")]
    InvalidFormat {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Validated currency code (exactly 3 uppercase ASCII letters)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Create a new validated CurrencyCode
    ///
    /// # Validation Rules
    /// - Exactly 3 characters after trimming
    /// - Uppercase A-Z only
    ///
    /// # Examples
    /// ```
    /// use simple_bank::account::CurrencyCode;
    ///
    /// let usd = CurrencyCode::new("USD").unwrap();
    /// assert_eq!(usd.as_str(), "USD");
    ///
    /// assert!(CurrencyCode::new("usd").is_err());
    /// ```
    pub fn new(code: &str) -> Result<Self, ValidationError> {
        let code = code.trim();

        if code.chars().count() != 3 {
            return Err(ValidationError::InvalidLength {
                field: "currency",
                expected: 3,
                actual: code.chars().count(),
            });
        }

        let expected = code.to_ascii_uppercase();
        if code != expected {
            return Err(ValidationError::CurrencyNotUppercase {
                got: code.to_string(),
                expected,
            });
        }

        if !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidFormat {
                field: "currency",
                value: code.to_string(),
                expected: "uppercase letters only",
            });
        }

        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code_valid() {
        assert!(CurrencyCode::new("USD").is_ok());
        assert!(CurrencyCode::new("EUR").is_ok());
        assert_eq!(CurrencyCode::new(" CNY ").unwrap().as_str(), "CNY"); // trimmed
    }

    #[test]
    fn test_currency_code_uppercase_required() {
        let err = CurrencyCode::new("usd").unwrap_err();
        assert!(matches!(err, ValidationError::CurrencyNotUppercase { .. }));

        let err = CurrencyCode::new("Eur").unwrap_err();
        assert!(matches!(err, ValidationError::CurrencyNotUppercase { .. }));
    }

    #[test]
    fn test_currency_code_invalid_length() {
        let err = CurrencyCode::new("").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidLength { actual: 0, .. }));

        let err = CurrencyCode::new("USDT").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidLength { actual: 4, .. }));
    }

    #[test]
    fn test_currency_code_invalid_chars() {
        let err = CurrencyCode::new("U5D").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));

        let err = CurrencyCode::new("U_D").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn test_currency_code_display() {
        let code = CurrencyCode::new("USD").unwrap();
        assert_eq!(code.to_string(), "USD");
        assert_eq!(code.into_string(), "USD");
    }
}
