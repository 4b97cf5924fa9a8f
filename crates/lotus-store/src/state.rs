//! # Store State
//!
//! The domain state store: every collection, one logical writer.
//!
//! ## Thread Safety
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Store State Operations                               │
//! │                                                                         │
//! │  Frontend Action          Store Operation          State Change        │
//! │  ───────────────          ───────────────          ────────────        │
//! │                                                                         │
//! │  Checkout ───────────────► create_order() ───────► orders, products,   │
//! │                                                    customers, packages, │
//! │                                                    shift counters       │
//! │                                                                         │
//! │  Complete appointment ───► set_appointment_status► packages             │
//! │                                                                         │
//! │  Post goods received ────► create_stock_receipt ─► receipts, products   │
//! │                                                                         │
//! │  Every mutation runs to completion inside one &mut self call; the      │
//! │  SharedStore lock is the transactional boundary for the UI thread.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use lotus_core::{
    Appointment, Customer, Order, PermissionOverride, Product, RoleGroup, Shift, StockReceipt,
    TreatmentPackage, User, DEFAULT_TENANT_ID,
};

use crate::cart::Cart;
use crate::error::{StoreError, StoreResult};

// =============================================================================
// Store Configuration
// =============================================================================

/// Read-only store configuration, fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Display name printed on receipts.
    pub store_name: String,
    /// Vestigial tenant id stamped onto every created entity.
    pub tenant_id: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            store_name: "Lotus POS".to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// The in-memory domain state store.
///
/// Collections are plain vectors scanned linearly: a single-location store
/// holds hundreds of rows, not millions, and one logical writer mutates
/// them. Orders are kept newest-first.
///
/// All mutation operations live in the sibling modules (`orders`,
/// `packages`, `appointments`, `receipts`, `shifts`, `customers`,
/// `products`, `permissions`) as `impl Store` blocks; this module owns the
/// struct, construction, and shared lookup helpers.
#[derive(Debug, Default)]
pub struct Store {
    pub(crate) config: StoreConfig,

    pub(crate) products: Vec<Product>,
    pub(crate) orders: Vec<Order>,
    pub(crate) customers: Vec<Customer>,
    pub(crate) packages: Vec<TreatmentPackage>,
    pub(crate) appointments: Vec<Appointment>,
    pub(crate) receipts: Vec<StockReceipt>,
    pub(crate) shifts: Vec<Shift>,
    pub(crate) users: Vec<User>,
    pub(crate) role_groups: Vec<RoleGroup>,
    pub(crate) permission_overrides: Vec<PermissionOverride>,

    /// The sale being assembled right now.
    pub(crate) cart: Cart,

    /// Id of the currently open shift, if any. At most one shift is open.
    pub(crate) current_shift: Option<String>,
}

impl Store {
    /// Creates an empty store with default configuration.
    pub fn new() -> Self {
        Store::default()
    }

    /// Creates an empty store with explicit configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Store {
            config,
            ..Store::default()
        }
    }

    /// The store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Lookup helpers shared by the operation modules
    // -------------------------------------------------------------------------

    pub(crate) fn product_ref(&self, id: &str) -> StoreResult<&Product> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("Product", id))
    }

    pub(crate) fn product_mut(&mut self, id: &str) -> StoreResult<&mut Product> {
        self.products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("Product", id))
    }

    pub(crate) fn package_mut(&mut self, id: &str) -> StoreResult<&mut TreatmentPackage> {
        self.packages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("Treatment package", id))
    }

    pub(crate) fn appointment_mut(&mut self, id: &str) -> StoreResult<&mut Appointment> {
        self.appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::not_found("Appointment", id))
    }
}

// =============================================================================
// Shared Store
// =============================================================================

/// Shared handle over the store for the UI boundary.
///
/// ## Thread Safety
/// Uses `Arc<Mutex<Store>>`:
/// - `Arc`: shared ownership across UI event handlers
/// - `Mutex`: exactly one mutation at a time; holding the lock across a
///   whole operation is what makes each operation atomic from the
///   caller's perspective
///
/// ## Why Not RwLock?
/// Almost every operation writes, and each one is quick. An RwLock would
/// add complexity with minimal benefit.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<Store>>,
}

impl SharedStore {
    /// Wraps a store for shared access.
    pub fn new(store: Store) -> Self {
        SharedStore {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Executes a function with read access to the store.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let total = shared.with_store(|s| s.orders().len());
    /// ```
    pub fn with_store<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Store) -> R,
    {
        let store = self.inner.lock().expect("Store mutex poisoned");
        f(&store)
    }

    /// Executes a function with write access to the store.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// shared.with_store_mut(|s| s.create_order(input))?;
    /// ```
    pub fn with_store_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Store) -> R,
    {
        let mut store = self.inner.lock().expect("Store mutex poisoned");
        f(&mut store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store() {
        let store = Store::new();
        assert!(store.products.is_empty());
        assert!(store.orders.is_empty());
        assert!(store.current_shift.is_none());
    }

    #[test]
    fn test_shared_store_round_trip() {
        let shared = SharedStore::new(Store::new());
        let count = shared.with_store(|s| s.customers.len());
        assert_eq!(count, 0);
    }

    #[test]
    fn test_missing_product_lookup() {
        let store = Store::new();
        let err = store.product_ref("nope").unwrap_err();
        assert_eq!(err.to_string(), "Product not found: nope");
    }
}
