//! Request validation utilities for consistent validation across handlers

use crate::error::ApiError;

/// Trait for validating request payloads.
///
/// Implemented by all create/update request types so handlers validate in
/// one place with consistent error messages.
pub trait RequestValidation {
    /// Returns `Ok(())` if validation passes, or `Err(ApiError)` with a
    /// validation error message if it fails.
    fn validate(&self) -> Result<(), ApiError>;
}

/// Macro for validating fields with custom predicates
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
        validate_field!($field, !$field.trim().is_empty(), $message);
    };
}

/// Macro for validating string length
#[macro_export]
macro_rules! validate_length {
    ($field:expr, $min:expr, $max:expr, $message:expr) => {
        let len = $field.len();
        validate_field!($field, len >= $min && len <= $max, $message);
    };
}

/// Macro for validating email format (basic check)
#[macro_export]
macro_rules! validate_email {
    ($field:expr, $message:expr) => {
        validate_field!($field, $field.contains('@') && $field.contains('.'), $message);
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    struct TestRequest {
        email: String,
        description: String,
    }

    impl RequestValidation for TestRequest {
        fn validate(&self) -> Result<(), ApiError> {
            validate_email!(self.email, "Invalid email format");
            validate_required!(self.description, "Description is required");
            validate_length!(
                self.description,
                1,
                500,
                "Description must be at most 500 characters"
            );
            Ok(())
        }
    }

    #[test]
    fn valid_request_passes() {
        let request = TestRequest {
            email: "jane@example.com".to_string(),
            description: "Back pain consultation".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn malformed_email_fails() {
        let request = TestRequest {
            email: "not-an-email".to_string(),
            description: "Back pain consultation".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn blank_description_fails() {
        let request = TestRequest {
            email: "jane@example.com".to_string(),
            description: "   ".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
