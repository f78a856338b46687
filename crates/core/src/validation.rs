//! Input validation utilities.
//!
//! This module contains functions for validating user inputs to ensure they meet
//! correctness requirements before being used in billing operations.

use crate::constants::{MAX_POSTED_AMOUNT, MAX_RECENT_WINDOW};
use crate::{BillingError, BillingResult};
use rust_decimal::Decimal;

/// Validates an amount posted to a patient account.
///
/// # Errors
///
/// Returns `BillingError::Validation` if the amount is negative or exceeds
/// [`MAX_POSTED_AMOUNT`].
pub fn validate_posted_amount(amount: Decimal) -> BillingResult<Decimal> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(BillingError::Validation(format!(
            "posted amount cannot be negative (got {amount})"
        )));
    }

    if amount > MAX_POSTED_AMOUNT {
        return Err(BillingError::Validation(format!(
            "posted amount exceeds maximum of {} (got {amount})",
            MAX_POSTED_AMOUNT
        )));
    }

    Ok(amount)
}

/// Validates the number of recent events shown to departments.
///
/// # Errors
///
/// Returns `BillingError::Validation` if the window is zero or exceeds [`MAX_RECENT_WINDOW`].
pub fn validate_recent_window(window: usize) -> BillingResult<usize> {
    if window == 0 {
        return Err(BillingError::Validation(
            "recent window must be at least 1".into(),
        ));
    }

    if window > MAX_RECENT_WINDOW {
        return Err(BillingError::Validation(format!(
            "recent window exceeds maximum of {} events",
            MAX_RECENT_WINDOW
        )));
    }

    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_posted_amount_accepts_zero_and_positive() {
        assert!(validate_posted_amount(Decimal::ZERO).is_ok());
        assert!(validate_posted_amount(Decimal::new(7550, 2)).is_ok());
    }

    #[test]
    fn test_validate_posted_amount_rejects_negative() {
        let err = validate_posted_amount(Decimal::new(-100, 2)).expect_err("should reject");
        assert!(matches!(err, BillingError::Validation(msg) if msg.contains("cannot be negative")));
    }

    #[test]
    fn test_validate_posted_amount_rejects_above_maximum() {
        assert!(validate_posted_amount(MAX_POSTED_AMOUNT).is_ok());

        let err = validate_posted_amount(Decimal::MAX).expect_err("should reject");
        assert!(matches!(err, BillingError::Validation(msg) if msg.contains("exceeds maximum")));
    }

    #[test]
    fn test_validate_recent_window_bounds() {
        assert_eq!(validate_recent_window(3).expect("valid"), 3);

        let err = validate_recent_window(0).expect_err("should reject zero");
        assert!(matches!(err, BillingError::Validation(msg) if msg.contains("at least 1")));

        let err = validate_recent_window(MAX_RECENT_WINDOW + 1).expect_err("should reject");
        assert!(matches!(err, BillingError::Validation(msg) if msg.contains("exceeds maximum")));
    }
}
