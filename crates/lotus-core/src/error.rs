//! # Error Types
//!
//! Domain-specific error types for lotus-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lotus-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  lotus-store errors (separate crate)                                   │
//! │  └── StoreError       - Entity lookup failures + wrapped CoreError     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → UI toast             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, ID, etc.)
//! 3. Errors are enum variants, never String
//! 4. Every failure is a business-rule violation; nothing here is transient,
//!    so there is no retry machinery anywhere in the workspace

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An order or stock-out receipt would drive a product's on-hand
    /// quantity below zero. The whole operation is rejected; nothing is
    /// partially applied.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// A treatment-package session number was consumed twice.
    #[error("Session {session_number} of package {package_id} is already used")]
    DuplicateSessionUse {
        package_id: String,
        session_number: u32,
    },

    /// A treatment-package session number outside `[1, total_sessions]`.
    #[error("Session number {session_number} is out of range (package has {total_sessions} sessions)")]
    SessionNumberOutOfRange {
        session_number: u32,
        total_sessions: u32,
    },

    /// A technician already has an overlapping, non-cancelled appointment
    /// in the requested window. Carries the colliding booking so the UI can
    /// show which one.
    #[error("Technician {technician_id} is already booked (appointment {appointment_id})")]
    TechnicianConflict {
        technician_id: String,
        appointment_id: String,
    },

    /// Opening a shift while another one is still open.
    #[error("A shift is already open: {shift_id}")]
    ShiftAlreadyOpen { shift_id: String },

    /// An operation that requires an open shift ran without one.
    ///
    /// Order creation tolerates this (counters are simply not bumped);
    /// closing a shift does not.
    #[error("No shift is currently open")]
    NoActiveShift,

    /// Submitting an order from an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has exceeded maximum allowed items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// An appointment status change that the lifecycle does not allow.
    #[error("Appointment {appointment_id} is {current_status}, cannot move to {requested_status}")]
    InvalidStatusTransition {
        appointment_id: String,
        current_status: String,
        requested_status: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// The combined discount of an order exceeds its subtotal. Rejected
    /// rather than clamped so the total invariant stays exact.
    #[error("Discount {discount_cents} exceeds subtotal {subtotal_cents}")]
    DiscountExceedsSubtotal {
        discount_cents: i64,
        subtotal_cents: i64,
    },

    /// Invalid format (e.g., invalid phone number, invalid time).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate username).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
