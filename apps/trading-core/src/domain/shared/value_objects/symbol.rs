//! Symbol value object for instrument identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// Quote currencies that mark an unseparated symbol as a crypto pair.
const CRYPTO_QUOTE_SUFFIXES: &[&str] = &["USDT", "USDC", "BUSD"];

/// A trading symbol (ticker, OCC option symbol, or crypto pair).
///
/// Examples:
/// - Equity: "AAPL", "MSFT"
/// - Option: "AAPL250117P00190000" (OCC format)
/// - Crypto: "BTC-USD", "ETH/USDT", "SOLUSDT"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

/// Instrument class used to pick a primary venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolClass {
    /// Listed equities and ETFs.
    Equity,
    /// Listed options (OCC symbology).
    Option,
    /// Crypto spot pairs.
    Crypto,
}

impl fmt::Display for SymbolClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equity => write!(f, "equity"),
            Self::Option => write!(f, "option"),
            Self::Crypto => write!(f, "crypto"),
        }
    }
}

impl Symbol {
    /// Create a new Symbol.
    ///
    /// The symbol is normalized to uppercase.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_uppercase())
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is an option symbol (OCC format).
    ///
    /// OCC format: `{ROOT}{YY}{MM}{DD}{P/C}{PRICE}`
    #[must_use]
    pub fn is_option(&self) -> bool {
        let s = self.0.as_bytes();
        let len = s.len();
        if !(15..=21).contains(&len) {
            return false;
        }

        let type_pos = len - 9;
        let type_char = s[type_pos];
        if type_char != b'P' && type_char != b'C' {
            return false;
        }

        s[len - 8..].iter().all(u8::is_ascii_digit)
            && s[type_pos - 6..type_pos].iter().all(u8::is_ascii_digit)
    }

    /// Check if this is a crypto pair.
    #[must_use]
    pub fn is_crypto(&self) -> bool {
        if self.0.contains('-') || self.0.contains('/') {
            return true;
        }
        CRYPTO_QUOTE_SUFFIXES
            .iter()
            .any(|quote| self.0.len() > quote.len() && self.0.ends_with(quote))
    }

    /// Classify the symbol.
    #[must_use]
    pub fn class(&self) -> SymbolClass {
        if self.is_option() {
            SymbolClass::Option
        } else if self.is_crypto() {
            SymbolClass::Crypto
        } else {
            SymbolClass::Equity
        }
    }

    /// Validate the symbol for order submission.
    ///
    /// # Errors
    ///
    /// Returns error if symbol is empty, too long or contains invalid characters.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            return Err(DomainError::InvalidValue {
                field: "symbol".to_string(),
                message: "Symbol cannot be empty".to_string(),
            });
        }

        if self.0.len() > 21 {
            return Err(DomainError::InvalidValue {
                field: "symbol".to_string(),
                message: "Symbol exceeds maximum length".to_string(),
            });
        }

        if !self
            .0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '/' | '.'))
        {
            return Err(DomainError::InvalidValue {
                field: "symbol".to_string(),
                message: "Symbol contains invalid characters".to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
