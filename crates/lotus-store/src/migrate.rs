//! # Snapshot Hydration & Migration
//!
//! The store's boundary toward the host's key-value persistence wrapper.
//! The host loads one JSON document per tab session, hands it to
//! [`Store::from_snapshot`], and writes [`Store::snapshot`] back after
//! mutations.
//!
//! ## Migration-on-load
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 from_snapshot()                                         │
//! │                                                                         │
//! │  raw JSON ──► serde (lenient statuses, legacy field aliases)           │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │  migrate():  runs BEFORE any operation touches the data                │
//! │  ├── backfill missing appointment codes (continuing the LH sequence)   │
//! │  ├── default the session count of legacy treatment rows               │
//! │  ├── repair package counters from used_session_numbers                 │
//! │  └── drop a current-shift pointer that no open shift backs            │
//! │                                                                         │
//! │  Operations may assume the collections are valid from the first call. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lotus_core::{
    Appointment, Customer, Order, PermissionOverride, Product, ProductType, RoleGroup, Shift,
    StockReceipt, TreatmentPackage, User, APPOINTMENT_CODE_DIGITS, APPOINTMENT_CODE_PREFIX,
};

use crate::state::{Store, StoreConfig};

/// Serde view of every persisted collection.
///
/// Every field defaults so a snapshot written by an older build (or a
/// fresh install's empty document) hydrates cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub packages: Vec<TreatmentPackage>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub receipts: Vec<StockReceipt>,
    #[serde(default)]
    pub shifts: Vec<Shift>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub role_groups: Vec<RoleGroup>,
    #[serde(default)]
    pub permission_overrides: Vec<PermissionOverride>,
    #[serde(default)]
    pub current_shift: Option<String>,
}

impl Snapshot {
    /// Parses a snapshot from the host's JSON document.
    pub fn from_json(json: &str) -> Result<Snapshot, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes for the host to persist.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Normalizes a hydrated snapshot in place. Idempotent; running it over
/// an already-clean snapshot changes nothing.
pub fn migrate(snapshot: &mut Snapshot) {
    backfill_appointment_codes(snapshot);
    default_treatment_sessions(snapshot);
    repair_package_counters(snapshot);
    drop_stale_shift_pointer(snapshot);
}

fn backfill_appointment_codes(snapshot: &mut Snapshot) {
    let mut next = snapshot
        .appointments
        .iter()
        .filter_map(|a| a.code.strip_prefix(APPOINTMENT_CODE_PREFIX))
        .filter_map(|digits| digits.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
        + 1;

    for appointment in &mut snapshot.appointments {
        if appointment.code.trim().is_empty() {
            appointment.code = format!(
                "{}{:0width$}",
                APPOINTMENT_CODE_PREFIX,
                next,
                width = APPOINTMENT_CODE_DIGITS
            );
            debug!(appointment_id = %appointment.id, code = %appointment.code, "Backfilled appointment code");
            next += 1;
        }
    }
}

fn default_treatment_sessions(snapshot: &mut Snapshot) {
    for product in &mut snapshot.products {
        if product.product_type == ProductType::Treatment && product.sessions.is_none() {
            debug!(product_id = %product.id, "Treatment row without session count, defaulting to 1");
            product.sessions = Some(1);
        }
    }
}

/// Recomputes `remaining_sessions`/`is_active` from the used set so the
/// package invariant holds regardless of what the legacy store wrote.
fn repair_package_counters(snapshot: &mut Snapshot) {
    for package in &mut snapshot.packages {
        package.used_session_numbers.sort_unstable();
        package.used_session_numbers.dedup();
        package
            .used_session_numbers
            .retain(|n| *n >= 1 && *n <= package.total_sessions);

        let used = package.used_session_numbers.len() as u32;
        let remaining = package.total_sessions - used;
        if package.remaining_sessions != remaining || package.is_active != (remaining > 0) {
            debug!(package_id = %package.id, "Repaired drifted package counters");
        }
        package.remaining_sessions = remaining;
        package.is_active = remaining > 0;
    }
}

fn drop_stale_shift_pointer(snapshot: &mut Snapshot) {
    if let Some(id) = &snapshot.current_shift {
        let backed = snapshot
            .shifts
            .iter()
            .any(|s| &s.id == id && s.is_open());
        if !backed {
            debug!(shift_id = %id, "Dropped current-shift pointer with no open shift behind it");
            snapshot.current_shift = None;
        }
    }
}

impl Store {
    /// Hydrates a store from a snapshot, running [`migrate`] first.
    pub fn from_snapshot(mut snapshot: Snapshot, config: StoreConfig) -> Store {
        migrate(&mut snapshot);

        info!(
            products = snapshot.products.len(),
            orders = snapshot.orders.len(),
            customers = snapshot.customers.len(),
            packages = snapshot.packages.len(),
            appointments = snapshot.appointments.len(),
            "Store hydrated"
        );

        Store {
            config,
            products: snapshot.products,
            orders: snapshot.orders,
            customers: snapshot.customers,
            packages: snapshot.packages,
            appointments: snapshot.appointments,
            receipts: snapshot.receipts,
            shifts: snapshot.shifts,
            users: snapshot.users,
            role_groups: snapshot.role_groups,
            permission_overrides: snapshot.permission_overrides,
            cart: Default::default(),
            current_shift: snapshot.current_shift,
        }
    }

    /// The persistable view of the store. The cart is transient and
    /// deliberately not part of it.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            products: self.products.clone(),
            orders: self.orders.clone(),
            customers: self.customers.clone(),
            packages: self.packages.clone(),
            appointments: self.appointments.clone(),
            receipts: self.receipts.clone(),
            shifts: self.shifts.clone(),
            users: self.users.clone(),
            role_groups: self.role_groups.clone(),
            permission_overrides: self.permission_overrides.clone(),
            current_shift: self.current_shift.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{store_with_products, test_product, test_treatment};
    use chrono::{NaiveDate, NaiveTime, Utc};
    use lotus_core::{AppointmentStatus, SessionItem, SessionPlan};

    fn appointment(id: &str, code: &str) -> Appointment {
        Appointment {
            id: id.to_string(),
            tenant_id: lotus_core::DEFAULT_TENANT_ID.to_string(),
            code: code.to_string(),
            customer_id: "cus-1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 18).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            status: AppointmentStatus::Pending,
            services: Vec::new(),
            note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut store = store_with_products(vec![test_product("p1", 1000)]);
        store.open_shift("cashier-1", 5000).unwrap();

        let json = store.snapshot().to_json().unwrap();
        let restored = Store::from_snapshot(
            Snapshot::from_json(&json).unwrap(),
            StoreConfig::default(),
        );

        assert_eq!(restored.products().len(), 1);
        assert!(restored.current_shift().is_some());
        assert!(restored.cart.is_empty());
    }

    #[test]
    fn test_backfill_appointment_codes_continues_sequence() {
        let mut snapshot = Snapshot {
            appointments: vec![
                appointment("a1", "LH000007"),
                appointment("a2", ""),
                appointment("a3", ""),
            ],
            ..Snapshot::default()
        };

        migrate(&mut snapshot);

        assert_eq!(snapshot.appointments[0].code, "LH000007");
        assert_eq!(snapshot.appointments[1].code, "LH000008");
        assert_eq!(snapshot.appointments[2].code, "LH000009");
    }

    #[test]
    fn test_lenient_status_hydration() {
        let mut apt = appointment("a1", "LH000001");
        apt.status = AppointmentStatus::Completed;
        let mut json = serde_json::to_value(&apt).unwrap();
        json["status"] = serde_json::Value::String("definitely-not-a-status".to_string());

        let hydrated: Appointment = serde_json::from_value(json).unwrap();
        assert_eq!(hydrated.status, AppointmentStatus::Pending);
    }

    #[test]
    fn test_repair_package_counters() {
        let mut snapshot = Snapshot {
            packages: vec![TreatmentPackage {
                id: "pkg-1".to_string(),
                tenant_id: lotus_core::DEFAULT_TENANT_ID.to_string(),
                customer_id: "cus-1".to_string(),
                treatment_product_id: "t1".to_string(),
                product_name: "Facial course".to_string(),
                order_id: "ord-1".to_string(),
                total_sessions: 5,
                // Duplicates, an out-of-range 9, and counters that lie.
                used_session_numbers: vec![2, 2, 9, 4],
                remaining_sessions: 0,
                sessions: vec![SessionPlan {
                    session_number: 1,
                    items: vec![SessionItem {
                        product_id: "t1".to_string(),
                        name: "Facial course".to_string(),
                        quantity: 1,
                    }],
                }],
                is_active: false,
                purchase_date: Utc::now(),
                expiry_date: None,
            }],
            ..Snapshot::default()
        };

        migrate(&mut snapshot);

        let pkg = &snapshot.packages[0];
        assert_eq!(pkg.used_session_numbers, vec![2, 4]);
        assert_eq!(pkg.remaining_sessions, 3);
        assert!(pkg.is_active);
        assert!(pkg.invariant_holds());
    }

    #[test]
    fn test_treatment_rows_get_default_session_count() {
        let mut treatment = test_treatment("t1", 50_000, 3);
        treatment.sessions = None;
        let mut snapshot = Snapshot {
            products: vec![treatment],
            ..Snapshot::default()
        };

        migrate(&mut snapshot);
        assert_eq!(snapshot.products[0].sessions, Some(1));
    }

    #[test]
    fn test_stale_shift_pointer_dropped() {
        let mut snapshot = Snapshot {
            current_shift: Some("shift-gone".to_string()),
            ..Snapshot::default()
        };

        migrate(&mut snapshot);
        assert!(snapshot.current_shift.is_none());
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let mut snapshot = Snapshot {
            appointments: vec![appointment("a1", "")],
            ..Snapshot::default()
        };

        migrate(&mut snapshot);
        let once = snapshot.clone();
        migrate(&mut snapshot);

        assert_eq!(once.appointments[0].code, snapshot.appointments[0].code);
    }
}
