//! Error classification.
//!
//! Every domain error maps onto one of a handful of classes. Transport layers
//! translate a class into a status code; the domain never does.

use std::fmt;

/// Coarse error class, independent of transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Malformed input, short password, missing required field
    Validation,
    /// Bad credentials, missing/expired/foreign session, invalid signature
    Authentication,
    /// Archived or absent record
    NotFound,
    /// Uniqueness collision (duplicate email)
    Conflict,
    /// Store unreachable, transaction failure, encoding failure
    Internal,
}

impl ErrorClass {
    /// Whether the error detail is safe to show to a client.
    pub fn is_client_safe(self) -> bool {
        !matches!(self, ErrorClass::Internal)
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorClass::Validation => "validation",
            ErrorClass::Authentication => "authentication",
            ErrorClass::NotFound => "not_found",
            ErrorClass::Conflict => "conflict",
            ErrorClass::Internal => "internal",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_internal_is_hidden() {
        assert!(ErrorClass::Validation.is_client_safe());
        assert!(ErrorClass::Authentication.is_client_safe());
        assert!(ErrorClass::NotFound.is_client_safe());
        assert!(ErrorClass::Conflict.is_client_safe());
        assert!(!ErrorClass::Internal.is_client_safe());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorClass::NotFound.to_string(), "not_found");
    }
}
