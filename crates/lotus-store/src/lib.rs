//! # lotus-store: In-Memory Domain State Store
//!
//! Holds every collection of Lotus POS and exposes one operation per
//! mutation. Everything executes synchronously inside the caller's
//! stack; the [`SharedStore`] lock is the transactional boundary.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lotus POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Frontend (web UI) - external collaborator              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lotus-store (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌──────────┐ ┌──────────────┐ ┌────────────────┐  │   │
//! │  │  │  cart   │ │  orders  │ │   packages   │ │  appointments  │  │   │
//! │  │  │         │ │ pipeline │ │   tracker    │ │  + guard       │  │   │
//! │  │  └─────────┘ └──────────┘ └──────────────┘ └────────────────┘  │   │
//! │  │  ┌─────────┐ ┌──────────┐ ┌──────────────┐ ┌────────────────┐  │   │
//! │  │  │products │ │ receipts │ │    shifts    │ │ users/perms    │  │   │
//! │  │  └─────────┘ └──────────┘ └──────────────┘ └────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │  migrate: snapshot boundary to the persistence wrapper          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              lotus-core (pure business logic)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`] - the [`Store`] struct, configuration, shared handle
//! - [`cart`] - the sale being assembled
//! - [`orders`] - the order fulfillment pipeline
//! - [`packages`] - treatment package session tracker
//! - [`appointments`] - booking lifecycle and the technician guard
//! - [`receipts`] - stock-in/stock-out ledger
//! - [`shifts`] - cashier shift lifecycle
//! - [`customers`] - customer records
//! - [`permissions`] - role bundles, overrides, login
//! - [`migrate`] - snapshot hydration and migration-on-load
//! - [`error`] - store error types

pub mod appointments;
pub mod cart;
pub mod customers;
pub mod error;
pub mod migrate;
pub mod orders;
pub mod packages;
pub mod permissions;
pub mod products;
pub mod receipts;
pub mod shifts;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use appointments::{AppointmentInput, TechnicianConflict};
pub use cart::{Cart, CartItem, CartTotals};
pub use customers::CustomerInput;
pub use error::{StoreError, StoreResult};
pub use migrate::{migrate, Snapshot};
pub use orders::CreateOrderInput;
pub use permissions::{default_role_groups, UserInput, PERMISSION_CATALOG};
pub use products::ProductInput;
pub use receipts::{ReceiptItemInput, StockReceiptInput};
pub use state::{SharedStore, Store, StoreConfig};
