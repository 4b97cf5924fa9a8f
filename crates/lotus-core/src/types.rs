//! # Domain Types
//!
//! Core domain types used throughout Lotus POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────┐      │
//! │  │    Product      │   │     Order       │   │ TreatmentPackage │      │
//! │  │  ─────────────  │   │  ─────────────  │   │  ──────────────  │      │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)       │      │
//! │  │  product_type   │   │  items (frozen) │   │  used sessions   │      │
//! │  │  price_cents    │   │  total_cents    │   │  session plans   │      │
//! │  │  stock          │   │  payment_history│   │  remaining       │      │
//! │  └─────────────────┘   └─────────────────┘   └──────────────────┘      │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────┐      │
//! │  │   Appointment   │   │     Shift       │   │   StockReceipt   │      │
//! │  │  ─────────────  │   │  ─────────────  │   │  ──────────────  │      │
//! │  │  code (LH…)     │   │  opening cash   │   │  number (IN-…)   │      │
//! │  │  services[]     │   │  running totals │   │  items[]         │      │
//! │  │  status         │   │  difference     │   │  kind (in/out)   │      │
//! │  └─────────────────┘   └─────────────────┘   └──────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity has a UUID v4 `id`, immutable once created. Business codes
//! (appointment `LH000042`, receipt `IN-20260115-003`) are display-facing
//! and generated by the store from their own sequences.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// What kind of thing a product row represents.
///
/// Only `Product` rows carry physical stock. `Service` rows are performed
/// work; `Treatment` rows are multi-session packages that materialize a
/// [`TreatmentPackage`] per unit sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// Physical retail item with on-hand stock.
    Product,
    /// A single performed service (haircut, massage).
    Service,
    /// A multi-session treatment package.
    Treatment,
}

impl Default for ProductType {
    fn default() -> Self {
        ProductType::Product
    }
}

/// One line of a treatment session template: what a numbered session
/// consumes, referenced by product id.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionTemplateItem {
    pub product_id: String,
    pub quantity: i64,
}

/// Template for one numbered session of a treatment product.
///
/// Templates reference products by id only; names are resolved into a
/// [`SessionPlan`] snapshot when a package is sold.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionTemplate {
    pub session_number: u32,
    pub items: Vec<SessionTemplateItem>,
}

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant this product belongs to (vestigial, single-tenant runtime).
    pub tenant_id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Barcode (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Category label for the sale screen grid.
    pub category: String,

    /// Unit price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Current on-hand stock. Meaningful only for `ProductType::Product`.
    pub stock: i64,

    /// Whether this row is a retail product, a service, or a treatment.
    #[serde(alias = "productType", alias = "type")]
    pub product_type: ProductType,

    /// Number of sessions in a treatment package. `None` for non-treatments.
    pub sessions: Option<u32>,

    /// Optional per-session consumption templates for treatments.
    #[serde(default, alias = "sessionDetails")]
    pub session_details: Option<Vec<SessionTemplate>>,

    /// Soft-delete marker. Deleted rows are filtered from every listing
    /// but kept for order/receipt history.
    #[ts(as = "Option<String>")]
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether this row carries physical stock.
    #[inline]
    pub fn tracks_stock(&self) -> bool {
        self.product_type == ProductType::Product
    }

    /// Whether this row materializes treatment packages when sold.
    #[inline]
    pub fn is_treatment(&self) -> bool {
        self.product_type == ProductType::Treatment
    }

    /// Whether the row has been soft-deleted.
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Checks if the requested quantity can be fulfilled from stock.
    /// Non-stock rows (services, treatments) always can.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        !self.tracks_stock() || self.stock >= quantity
    }
}

// =============================================================================
// Orders
// =============================================================================

/// The status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Paid and fully applied: stock moved, packages materialized.
    Completed,
    /// Parked cart snapshot. No side effects were applied.
    Held,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Completed
    }
}

/// How an order was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on external terminal.
    Card,
    /// Bank transfer (QR on receipt).
    Transfer,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

/// One entry of an order's append-only payment history.
///
/// Every order gets a seed entry at creation; further entries record
/// settlement of held orders or additional tenders.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentEvent {
    /// Amount credited toward the order total.
    pub amount_cents: i64,
    /// Amount the customer actually handed over.
    pub received_cents: i64,
    /// Change returned: `received - amount` (negative = outstanding).
    pub change_cents: i64,
    pub method: PaymentMethod,
    #[ts(as = "String")]
    pub paid_at: DateTime<Utc>,
}

/// A line item in an order.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Product kind at time of sale (frozen; drives package materialization).
    pub product_type: ProductType,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Quantity sold.
    pub quantity: i64,
    /// Per-unit discount in cents applied to this line.
    pub discount_cents: i64,
    /// Line total before discounts (unit_price × quantity).
    pub line_total_cents: i64,
}

impl OrderItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Discount contributed by this line: per-unit discount × quantity.
    #[inline]
    pub fn line_discount_cents(&self) -> i64 {
        self.discount_cents * self.quantity
    }
}

/// An immutable-after-creation record of a sale.
///
/// Invariants at creation time (checked by the fulfillment pipeline, not
/// re-validated later):
/// - `subtotal_cents == Σ(item.unit_price × item.quantity)`
/// - `total_cents == subtotal_cents - discount_cents`
/// - completed orders carry at least one `payment_history` entry
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub tenant_id: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub subtotal_cents: i64,
    /// Combined discount: per-line discounts plus the order-level discount.
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    /// Resolved customer, when the sale was attached to one.
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub note: Option<String>,
    /// Shift that was open when the order was created, if any.
    pub shift_id: Option<String>,
    pub payment_history: Vec<PaymentEvent>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Checks the creation-time totals invariant.
    pub fn totals_consistent(&self) -> bool {
        let items_subtotal: i64 = self
            .items
            .iter()
            .map(|i| i.unit_price_cents * i.quantity)
            .sum();
        items_subtotal == self.subtotal_cents
            && self.total_cents == self.subtotal_cents - self.discount_cents
    }
}

// =============================================================================
// Shift
// =============================================================================

/// The status of a cashier shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Open,
    Closed,
}

/// A cashier's open-to-close session.
///
/// `total_orders`/`total_revenue_cents` are running counters bumped by
/// every completed order while the shift is open. At close,
/// `difference_cents = closing_cash - expected_cash`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Shift {
    pub id: String,
    pub tenant_id: String,
    pub cashier_id: String,
    pub status: ShiftStatus,
    pub opening_cash_cents: i64,
    /// Counted cash at close.
    pub closing_cash_cents: Option<i64>,
    /// `opening_cash + total_revenue`, fixed at close.
    pub expected_cash_cents: Option<i64>,
    /// `closing_cash - expected_cash`; negative = drawer short.
    pub difference_cents: Option<i64>,
    pub total_orders: i64,
    pub total_revenue_cents: i64,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Shift {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == ShiftStatus::Open
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A person/org record with spend aggregates.
///
/// `total_spent_cents`/`total_orders` are maintained by the order
/// fulfillment pipeline whenever a completed order resolves to this
/// customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    #[serde(alias = "_id")]
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    #[serde(default)]
    pub total_spent_cents: i64,
    #[serde(default)]
    pub total_orders: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Treatment Package
// =============================================================================

/// One resolved consumption line of a package session (names frozen at
/// purchase time, snapshot pattern).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionItem {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
}

/// The resolved plan for one numbered session of a purchased package.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionPlan {
    pub session_number: u32,
    pub items: Vec<SessionItem>,
}

/// A purchased multi-session treatment package.
///
/// ## Invariants
/// - `remaining_sessions + used_session_numbers.len() == total_sessions`
/// - `used_session_numbers` holds no duplicates, all within
///   `[1, total_sessions]`
/// - `is_active == (remaining_sessions > 0)`
///
/// [`TreatmentPackage::use_session`] and
/// [`TreatmentPackage::return_session`] are the only mutation paths and
/// uphold all three.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TreatmentPackage {
    pub id: String,
    pub tenant_id: String,
    pub customer_id: String,
    pub treatment_product_id: String,
    /// Treatment name at purchase time (frozen).
    pub product_name: String,
    /// Order this package was created from.
    pub order_id: String,
    pub total_sessions: u32,
    #[serde(default, alias = "usedSessionNumbers")]
    pub used_session_numbers: Vec<u32>,
    pub remaining_sessions: u32,
    pub sessions: Vec<SessionPlan>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub purchase_date: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
}

impl TreatmentPackage {
    /// Whether the given session number has been consumed.
    pub fn is_session_used(&self, session_number: u32) -> bool {
        self.used_session_numbers.contains(&session_number)
    }

    /// Consumes a numbered session.
    ///
    /// Rejects numbers outside `[1, total_sessions]` and numbers already
    /// consumed, leaving the package untouched on failure.
    pub fn use_session(&mut self, session_number: u32) -> CoreResult<()> {
        if session_number == 0 || session_number > self.total_sessions {
            return Err(CoreError::SessionNumberOutOfRange {
                session_number,
                total_sessions: self.total_sessions,
            });
        }
        if self.is_session_used(session_number) {
            return Err(CoreError::DuplicateSessionUse {
                package_id: self.id.clone(),
                session_number,
            });
        }

        self.used_session_numbers.push(session_number);
        self.remaining_sessions -= 1;
        self.is_active = self.remaining_sessions > 0;
        Ok(())
    }

    /// Restores a previously-consumed session.
    ///
    /// Returns `false` when the number was not marked used (nothing
    /// changes); the caller decides whether that is worth surfacing.
    pub fn return_session(&mut self, session_number: u32) -> bool {
        let before = self.used_session_numbers.len();
        self.used_session_numbers.retain(|n| *n != session_number);
        if self.used_session_numbers.len() == before {
            return false;
        }

        self.remaining_sessions += 1;
        self.is_active = true;
        true
    }

    /// Whether any *unused* session of this package covers the given
    /// product/service id.
    pub fn has_unused_session_for(&self, product_id: &str) -> bool {
        self.sessions.iter().any(|plan| {
            !self.is_session_used(plan.session_number)
                && plan.items.iter().any(|item| item.product_id == product_id)
        })
    }

    /// Checks all three package invariants. Used by tests and the
    /// hydration repair pass.
    pub fn invariant_holds(&self) -> bool {
        let mut seen = self.used_session_numbers.clone();
        seen.sort_unstable();
        seen.dedup();

        seen.len() == self.used_session_numbers.len()
            && self
                .used_session_numbers
                .iter()
                .all(|n| *n >= 1 && *n <= self.total_sessions)
            && self.remaining_sessions as usize + self.used_session_numbers.len()
                == self.total_sessions as usize
            && self.is_active == (self.remaining_sessions > 0)
    }
}

// =============================================================================
// Appointment
// =============================================================================

/// The lifecycle status of an appointment.
///
/// Deserialization is deliberately lenient: legacy stores carried free-
/// form status strings, and anything unrecognized hydrates as `Pending`
/// (see [`AppointmentStatus::parse_loose`]). Serialization always writes
/// the canonical kebab-case spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TS)]
#[ts(export)]
#[ts(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Canonical wire spelling.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::InProgress => "in-progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl Serialize for AppointmentStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AppointmentStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(AppointmentStatus::parse_loose(&raw))
    }
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        AppointmentStatus::Pending
    }
}

impl AppointmentStatus {
    /// Parses the wire spelling, tolerating legacy junk by mapping
    /// anything unknown to `Pending`. Used by the hydration hook.
    pub fn parse_loose(raw: &str) -> AppointmentStatus {
        match raw.trim().to_lowercase().as_str() {
            "pending" => AppointmentStatus::Pending,
            "in-progress" | "in_progress" | "inprogress" => AppointmentStatus::InProgress,
            "completed" | "done" => AppointmentStatus::Completed,
            "cancelled" | "canceled" => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Pending,
        }
    }
}

/// One service performed within an appointment.
///
/// Services carry their own optional technician and time sub-window -
/// two services of one appointment may run back-to-back under different
/// technicians. A service tagged with `(treatment_package_id,
/// session_number)` consumes that package session when the appointment
/// completes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppointmentService {
    pub product_id: String,
    /// Service name at booking time (frozen).
    pub name: String,
    pub technician_id: Option<String>,
    #[ts(as = "Option<String>")]
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[ts(as = "Option<String>")]
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub treatment_package_id: Option<String>,
    #[serde(default)]
    pub session_number: Option<u32>,
}

/// A scheduled customer visit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Appointment {
    pub id: String,
    pub tenant_id: String,
    /// Business code, `LH` + zero-padded 6-digit sequence. Hydration
    /// backfills rows that predate codes (empty string until then).
    #[serde(default)]
    pub code: String,
    pub customer_id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[ts(as = "String")]
    pub start_time: NaiveTime,
    #[ts(as = "String")]
    pub end_time: NaiveTime,
    pub status: AppointmentStatus,
    pub services: Vec<AppointmentService>,
    pub note: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Whether any service of this appointment is assigned to the
    /// technician.
    pub fn involves_technician(&self, technician_id: &str) -> bool {
        self.services
            .iter()
            .any(|s| s.technician_id.as_deref() == Some(technician_id))
    }

    /// The appointment window as minutes since midnight, half-open.
    pub fn window_minutes(&self) -> (u32, u32) {
        (minutes_of(self.start_time), minutes_of(self.end_time))
    }
}

/// Minutes since midnight for a wall-clock time.
#[inline]
pub fn minutes_of(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

// =============================================================================
// Stock Receipts
// =============================================================================

/// Direction of a stock receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptKind {
    /// Goods received; stock goes up.
    In,
    /// Goods leaving (damage, transfer, internal use); stock goes down.
    Out,
}

impl ReceiptKind {
    /// Receipt number prefix: `IN` / `OUT`.
    pub const fn prefix(&self) -> &'static str {
        match self {
            ReceiptKind::In => "IN",
            ReceiptKind::Out => "OUT",
        }
    }

    /// Signed stock effect per unit: +1 for stock-in, -1 for stock-out.
    pub const fn sign(&self) -> i64 {
        match self {
            ReceiptKind::In => 1,
            ReceiptKind::Out => -1,
        }
    }
}

/// A line item of a stock receipt.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptItem {
    pub product_id: String,
    /// Product name at posting time (frozen).
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl ReceiptItem {
    /// Cost of this line: unit price × quantity.
    #[inline]
    pub fn line_cost_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }
}

/// A stock-in or stock-out ledger entry.
///
/// Each receipt's items were applied exactly once to product stock when it
/// was created; edits reverse the prior effect before applying the new one
/// so repeated edits never drift stock.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockReceipt {
    pub id: String,
    pub tenant_id: String,
    pub kind: ReceiptKind,
    /// `IN-YYYYMMDD-NNN` / `OUT-YYYYMMDD-NNN`, sequence scoped to the
    /// calendar day.
    pub number: String,
    /// Supplier for stock-in, reason for stock-out.
    pub note: Option<String>,
    pub items: Vec<ReceiptItem>,
    pub total_quantity: i64,
    pub total_cost_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl StockReceipt {
    /// Recomputes the aggregate totals from the line items.
    pub fn compute_totals(items: &[ReceiptItem]) -> (i64, i64) {
        let qty = items.iter().map(|i| i.quantity).sum();
        let cost = items.iter().map(|i| i.line_cost_cents()).sum();
        (qty, cost)
    }
}

// =============================================================================
// Users & Permissions
// =============================================================================

/// A named bundle of permission ids.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoleGroup {
    pub id: String,
    pub name: String,
    pub permissions: Vec<String>,
}

/// Per-user divergence from the role group's bundle.
///
/// Effective set = `(role.permissions - removed) ∪ added`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PermissionOverride {
    pub user_id: String,
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
}

/// A staff account.
///
/// Passwords are stored and compared in plaintext: this system runs in a
/// single browser tab with no server, and carries no security model at all.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub username: String,
    pub password: String,
    pub role_group_id: String,
    /// Technicians appear in the appointment scheduler.
    #[serde(default)]
    pub is_technician: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_package(total: u32) -> TreatmentPackage {
        TreatmentPackage {
            id: "pkg-1".to_string(),
            tenant_id: crate::DEFAULT_TENANT_ID.to_string(),
            customer_id: "cus-1".to_string(),
            treatment_product_id: "prd-1".to_string(),
            product_name: "Facial course".to_string(),
            order_id: "ord-1".to_string(),
            total_sessions: total,
            used_session_numbers: Vec::new(),
            remaining_sessions: total,
            sessions: (1..=total)
                .map(|n| SessionPlan {
                    session_number: n,
                    items: vec![SessionItem {
                        product_id: "prd-1".to_string(),
                        name: "Facial course".to_string(),
                        quantity: 1,
                    }],
                })
                .collect(),
            is_active: true,
            purchase_date: Utc::now(),
            expiry_date: None,
        }
    }

    #[test]
    fn test_use_session_decrements_remaining() {
        let mut pkg = test_package(3);
        pkg.use_session(2).unwrap();

        assert_eq!(pkg.remaining_sessions, 2);
        assert_eq!(pkg.used_session_numbers, vec![2]);
        assert!(pkg.is_active);
        assert!(pkg.invariant_holds());
    }

    #[test]
    fn test_use_last_session_deactivates() {
        let mut pkg = test_package(2);
        pkg.use_session(1).unwrap();
        pkg.use_session(2).unwrap();

        assert_eq!(pkg.remaining_sessions, 0);
        assert!(!pkg.is_active);
        assert!(pkg.invariant_holds());
    }

    #[test]
    fn test_use_session_rejects_duplicates_and_out_of_range() {
        let mut pkg = test_package(3);
        pkg.use_session(1).unwrap();

        assert!(matches!(
            pkg.use_session(1),
            Err(CoreError::DuplicateSessionUse { .. })
        ));
        assert!(matches!(
            pkg.use_session(0),
            Err(CoreError::SessionNumberOutOfRange { .. })
        ));
        assert!(matches!(
            pkg.use_session(4),
            Err(CoreError::SessionNumberOutOfRange { .. })
        ));
        // Failed calls must not move the counters.
        assert_eq!(pkg.remaining_sessions, 2);
        assert!(pkg.invariant_holds());
    }

    #[test]
    fn test_return_session_restores() {
        let mut pkg = test_package(2);
        pkg.use_session(1).unwrap();
        pkg.use_session(2).unwrap();
        assert!(!pkg.is_active);

        assert!(pkg.return_session(2));
        assert_eq!(pkg.remaining_sessions, 1);
        assert!(pkg.is_active);
        assert!(pkg.invariant_holds());

        // Returning a session that was never used is a no-op.
        assert!(!pkg.return_session(2));
        assert_eq!(pkg.remaining_sessions, 1);
        assert!(pkg.invariant_holds());
    }

    #[test]
    fn test_has_unused_session_for() {
        let mut pkg = test_package(2);
        assert!(pkg.has_unused_session_for("prd-1"));
        assert!(!pkg.has_unused_session_for("prd-2"));

        pkg.use_session(1).unwrap();
        pkg.use_session(2).unwrap();
        assert!(!pkg.has_unused_session_for("prd-1"));
    }

    #[test]
    fn test_order_totals_consistent() {
        let order = Order {
            id: "ord-1".to_string(),
            tenant_id: crate::DEFAULT_TENANT_ID.to_string(),
            status: OrderStatus::Completed,
            items: vec![OrderItem {
                product_id: "prd-1".to_string(),
                name_snapshot: "Shampoo".to_string(),
                product_type: ProductType::Product,
                unit_price_cents: 1500,
                quantity: 2,
                discount_cents: 0,
                line_total_cents: 3000,
            }],
            subtotal_cents: 3000,
            discount_cents: 500,
            total_cents: 2500,
            payment_method: PaymentMethod::Cash,
            customer_id: None,
            customer_name: None,
            customer_phone: None,
            note: None,
            shift_id: None,
            payment_history: Vec::new(),
            created_at: Utc::now(),
        };
        assert!(order.totals_consistent());
    }

    #[test]
    fn test_appointment_status_parse_loose() {
        assert_eq!(
            AppointmentStatus::parse_loose("in-progress"),
            AppointmentStatus::InProgress
        );
        assert_eq!(
            AppointmentStatus::parse_loose("CANCELED"),
            AppointmentStatus::Cancelled
        );
        assert_eq!(
            AppointmentStatus::parse_loose("???"),
            AppointmentStatus::Pending
        );
    }

    #[test]
    fn test_minutes_of() {
        let t = NaiveTime::from_hms_opt(10, 30, 0).unwrap();
        assert_eq!(minutes_of(t), 630);
    }

    #[test]
    fn test_receipt_kind_prefix_and_sign() {
        assert_eq!(ReceiptKind::In.prefix(), "IN");
        assert_eq!(ReceiptKind::Out.prefix(), "OUT");
        assert_eq!(ReceiptKind::In.sign(), 1);
        assert_eq!(ReceiptKind::Out.sign(), -1);
    }

    #[test]
    fn test_receipt_totals() {
        let items = vec![
            ReceiptItem {
                product_id: "prd-1".to_string(),
                name: "Shampoo".to_string(),
                quantity: 10,
                unit_price_cents: 1200,
            },
            ReceiptItem {
                product_id: "prd-2".to_string(),
                name: "Conditioner".to_string(),
                quantity: 5,
                unit_price_cents: 1500,
            },
        ];
        let (qty, cost) = StockReceipt::compute_totals(&items);
        assert_eq!(qty, 15);
        assert_eq!(cost, 10 * 1200 + 5 * 1500);
    }
}
