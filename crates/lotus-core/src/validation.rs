//! # Validation Module
//!
//! Input validation utilities for Lotus POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Store operation (Rust)                                       │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │                                                                         │
//! │  The store validates every input BEFORE touching any collection, so    │
//! │  a rejected call leaves the domain state exactly as it found it.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (product, customer, role group).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a customer phone number.
///
/// ## Rules
/// - Must not be empty
/// - Digits, spaces, `+`, `-`, parentheses only
/// - At most 20 characters
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if phone.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: 20,
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, +, -, ( )".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an item quantity for cart lines and receipt lines.
///
/// ## Rules
/// - Must be positive
/// - Must not exceed [`MAX_ITEM_QUANTITY`]
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or cash amount in cents.
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates the combined discount of an order against its subtotal.
///
/// Rejecting (rather than clamping) keeps the order-total invariant
/// `total == subtotal - discount` exact with no hidden adjustment.
pub fn validate_discount(discount_cents: i64, subtotal_cents: i64) -> ValidationResult<()> {
    if discount_cents < 0 {
        return Err(ValidationError::MustBePositive {
            field: "discount".to_string(),
        });
    }

    if discount_cents > subtotal_cents {
        return Err(ValidationError::DiscountExceedsSubtotal {
            discount_cents,
            subtotal_cents,
        });
    }

    Ok(())
}

/// Validates the session count of a treatment product.
pub fn validate_session_count(sessions: u32) -> ValidationResult<()> {
    if sessions == 0 {
        return Err(ValidationError::MustBePositive {
            field: "sessions".to_string(),
        });
    }

    if sessions > 365 {
        return Err(ValidationError::OutOfRange {
            field: "sessions".to_string(),
            min: 1,
            max: 365,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Shampoo 500ml").is_ok());
        assert!(validate_name("  ").is_err());
        assert!(validate_name(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+84 912 345 678").is_ok());
        assert!(validate_phone("(090) 123-4567").is_ok());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("phone@home").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_discount() {
        assert!(validate_discount(0, 1000).is_ok());
        assert!(validate_discount(1000, 1000).is_ok());
        assert!(matches!(
            validate_discount(1001, 1000),
            Err(ValidationError::DiscountExceedsSubtotal { .. })
        ));
        assert!(validate_discount(-1, 1000).is_err());
    }

    #[test]
    fn test_validate_session_count() {
        assert!(validate_session_count(10).is_ok());
        assert!(validate_session_count(0).is_err());
        assert!(validate_session_count(366).is_err());
    }
}
