//! Request validation utilities for consistent validation across handlers
//!
//! Provides a `RequestValidation` trait and helper macros so create/update
//! payloads validate the same way everywhere and produce consistent 400
//! messages.

use crate::error::ApiError;

/// Trait for validating request payloads
///
/// Implement this trait for all create/update request types so handlers can
/// call `request.validate()?` before touching the database.
pub trait RequestValidation {
    /// Validates the request and returns an error if validation fails
    fn validate(&self) -> Result<(), ApiError>;
}

/// Macro for validating fields with custom predicates
///
/// # Usage
///
/// ```ignore
/// validate_field!(self.amount, self.amount > Decimal::ZERO, "Amount must be positive");
/// ```
#[macro_export]
macro_rules! validate_field {
    ($field:expr, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::validation($message));
        }
    };
}

/// Macro for validating required fields (non-empty strings)
#[macro_export]
macro_rules! validate_required {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, !$field.trim().is_empty(), $message);
    };
}

/// Macro for validating UUID fields (non-nil)
#[macro_export]
macro_rules! validate_uuid {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, !$field.is_nil(), $message);
    };
}

/// Macro for validating string length
#[macro_export]
macro_rules! validate_length {
    ($field:expr, $min:expr, $max:expr, $message:expr) => {
        let len = $field.len();
        $crate::validate_field!($field, len >= $min && len <= $max, $message);
    };
}

/// Macro for validating that a Decimal amount is strictly positive
#[macro_export]
macro_rules! validate_positive {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, $field > rust_decimal::Decimal::ZERO, $message);
    };
}

/// Macro for validating that a value is one of an allowed set
#[macro_export]
macro_rules! validate_one_of {
    ($field:expr, $allowed:expr, $message:expr) => {
        $crate::validate_field!($field, $allowed.contains(&$field.as_str()), $message);
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    struct CreateDonationProbe {
        amount: Decimal,
        payment_mode: String,
        purpose: String,
    }

    impl RequestValidation for CreateDonationProbe {
        fn validate(&self) -> Result<(), ApiError> {
            validate_positive!(self.amount, "Donation amount must be positive");
            validate_one_of!(
                self.payment_mode,
                ["cash", "bank", "upi", "cheque", "card"],
                "Invalid payment mode"
            );
            validate_required!(self.purpose, "Purpose is required");
            Ok(())
        }
    }

    #[test]
    fn test_valid_request_passes() {
        let req = CreateDonationProbe {
            amount: Decimal::new(50000, 2),
            payment_mode: "cash".to_string(),
            purpose: "Annadanam".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let req = CreateDonationProbe {
            amount: Decimal::ZERO,
            payment_mode: "cash".to_string(),
            purpose: "Annadanam".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_unknown_payment_mode_rejected() {
        let req = CreateDonationProbe {
            amount: Decimal::ONE,
            payment_mode: "barter".to_string(),
            purpose: "Annadanam".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_blank_required_field_rejected() {
        let req = CreateDonationProbe {
            amount: Decimal::ONE,
            payment_mode: "cash".to_string(),
            purpose: "   ".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
