//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the account and
//! department constructors. Nothing in the core reads process-wide environment variables; the
//! binaries read them and hand the raw values to the parsing helpers below.

use crate::constants::{DEFAULT_CURRENCY_SYMBOL, DEFAULT_RECENT_WINDOW};
use crate::validation::validate_recent_window;
use crate::{BillingError, BillingResult};

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    recent_window: usize,
    currency_symbol: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Validation` if `recent_window` is out of range or
    /// `currency_symbol` is blank.
    pub fn new(recent_window: usize, currency_symbol: String) -> BillingResult<Self> {
        let recent_window = validate_recent_window(recent_window)?;

        if currency_symbol.trim().is_empty() {
            return Err(BillingError::Validation(
                "currency_symbol cannot be empty".into(),
            ));
        }

        Ok(Self {
            recent_window,
            currency_symbol,
        })
    }

    /// Number of most recent service events included in each notification.
    pub fn recent_window(&self) -> usize {
        self.recent_window
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            recent_window: DEFAULT_RECENT_WINDOW,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

/// Parse the recent-events window from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_RECENT_WINDOW`].
pub fn recent_window_from_env_value(value: Option<String>) -> BillingResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let parsed = value
        .map(|v| {
            v.parse::<usize>().map_err(|_| {
                BillingError::Validation(format!("recent window is not a number: {v}"))
            })
        })
        .transpose()?;

    validate_recent_window(parsed.unwrap_or(DEFAULT_RECENT_WINDOW))
}

/// Parse the currency symbol from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_CURRENCY_SYMBOL`].
pub fn currency_symbol_from_env_value(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string())
}
