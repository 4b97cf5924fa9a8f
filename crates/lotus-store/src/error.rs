//! # Store Error Types
//!
//! Error types for domain-store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  CoreError (business rule, from lotus-core)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds entity-lookup failures                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UI layer shows an error toast and the call site decides what next     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call site is a direct, synchronous UI action; failures are
//! returned, never thrown, and nothing here warrants a retry.

use thiserror::Error;

use lotus_core::CoreError;

/// Domain-store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found in its collection.
    ///
    /// Covers products, orders, customers, packages, appointments,
    /// receipts, shifts, and users; `entity` names the collection.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Business rule violation from the core layer.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<lotus_core::ValidationError> for StoreError {
    fn from(err: lotus_core::ValidationError) -> Self {
        StoreError::Core(CoreError::Validation(err))
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
