//! Constants used throughout the billing core crate.

use billing_types::UnitPrice;
use rust_decimal::Decimal;

/// Number of most recent service events a department sees on each notification.
pub const DEFAULT_RECENT_WINDOW: usize = 3;

/// Upper bound accepted for the recent-events window.
pub const MAX_RECENT_WINDOW: usize = 100;

/// Largest amount accepted for a single posted service.
pub const MAX_POSTED_AMOUNT: Decimal = UnitPrice::MAX;

/// Currency symbol used when rendering amounts for departments.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// Environment variable overriding [`DEFAULT_RECENT_WINDOW`].
pub const RECENT_WINDOW_ENV: &str = "BILLING_RECENT_WINDOW";

/// Environment variable overriding [`DEFAULT_CURRENCY_SYMBOL`].
pub const CURRENCY_SYMBOL_ENV: &str = "BILLING_CURRENCY_SYMBOL";
