//! # Treatment Package Session Tracker
//!
//! Tracks purchased multi-session packages: which numbered sessions were
//! consumed, which remain, and which package can serve a booked service.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               Treatment Package Lifecycle                               │
//! │                                                                         │
//! │  Order with a treatment line (qty N)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  N independent packages, remaining == total, used == []                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Appointment completed ──► use_package_session(pkg, n)                 │
//! │  Appointment cancelled ──► return_package_session(pkg, n)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  remaining == 0 ──► is_active = false (package exhausted)              │
//! │                                                                         │
//! │  Invariant at every step:                                              │
//! │    remaining + used.len() == total, used duplicate-free, in range      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The counter arithmetic itself lives on
//! [`lotus_core::TreatmentPackage`]; this module owns the collection,
//! the queries, and materialization at checkout.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use lotus_core::{SessionItem, SessionPlan, TreatmentPackage};

use crate::cart::CartItem;
use crate::error::StoreResult;
use crate::state::Store;

impl Store {
    /// Consumes a numbered session of a package.
    ///
    /// Fails with `SessionNumberOutOfRange` / `DuplicateSessionUse`
    /// without touching the package.
    pub fn use_package_session(&mut self, package_id: &str, session_number: u32) -> StoreResult<()> {
        let package = self.package_mut(package_id)?;
        package.use_session(session_number)?;

        info!(
            package_id = %package_id,
            session = %session_number,
            remaining = %package.remaining_sessions,
            "Package session used"
        );
        Ok(())
    }

    /// Restores a previously-consumed session.
    ///
    /// Returns `Ok(false)` when the number was not marked used - nothing
    /// changes and the caller may surface it or not.
    pub fn return_package_session(
        &mut self,
        package_id: &str,
        session_number: u32,
    ) -> StoreResult<bool> {
        let package = self.package_mut(package_id)?;
        let returned = package.return_session(session_number);

        if returned {
            info!(
                package_id = %package_id,
                session = %session_number,
                remaining = %package.remaining_sessions,
                "Package session returned"
            );
        } else {
            debug!(
                package_id = %package_id,
                session = %session_number,
                "Return ignored: session was not used"
            );
        }
        Ok(returned)
    }

    /// All packages.
    pub fn packages(&self) -> &[TreatmentPackage] {
        &self.packages
    }

    /// Looks up a package by id.
    pub fn package(&self, id: &str) -> Option<&TreatmentPackage> {
        self.packages.iter().find(|p| p.id == id)
    }

    /// Active packages of a customer: `is_active` AND sessions left.
    ///
    /// Both conditions are checked even though `is_active` is defined by
    /// the second; hydrated legacy data may carry a drifted flag until
    /// the migration repair pass runs.
    pub fn customer_active_packages(&self, customer_id: &str) -> Vec<&TreatmentPackage> {
        self.packages
            .iter()
            .filter(|p| p.customer_id == customer_id && p.is_active && p.remaining_sessions > 0)
            .collect()
    }

    /// Finds an active package of the customer with an unused session
    /// covering the given service/product id.
    ///
    /// Coverage means some unused numbered session's plan lists the
    /// product among its items.
    pub fn package_for_service(
        &self,
        customer_id: &str,
        service_id: &str,
    ) -> Option<&TreatmentPackage> {
        self.customer_active_packages(customer_id)
            .into_iter()
            .find(|p| p.has_unused_session_for(service_id))
    }

    /// Materializes packages for one treatment cart line: one package
    /// instance per unit of quantity purchased.
    ///
    /// A sale without a resolved customer still creates the packages,
    /// with an empty customer link; the spa desk attaches them later by
    /// editing the customer record.
    pub(crate) fn materialize_packages(
        &mut self,
        order_id: &str,
        customer_id: Option<&str>,
        line: &CartItem,
    ) -> StoreResult<()> {
        let product = self.product_ref(&line.product_id)?;
        let total_sessions = product.sessions.unwrap_or(1);
        let product_name = product.name.clone();
        let sessions = self.build_session_plans(&line.product_id, total_sessions);

        for _ in 0..line.quantity {
            let package = TreatmentPackage {
                id: Uuid::new_v4().to_string(),
                tenant_id: self.config.tenant_id.clone(),
                customer_id: customer_id.unwrap_or_default().to_string(),
                treatment_product_id: line.product_id.clone(),
                product_name: product_name.clone(),
                order_id: order_id.to_string(),
                total_sessions,
                used_session_numbers: Vec::new(),
                remaining_sessions: total_sessions,
                sessions: sessions.clone(),
                is_active: true,
                purchase_date: Utc::now(),
                expiry_date: None,
            };

            info!(
                package_id = %package.id,
                order_id = %order_id,
                product = %product_name,
                sessions = %total_sessions,
                "Treatment package created"
            );
            self.packages.push(package);
        }

        Ok(())
    }

    /// Resolves a treatment's session templates into frozen plans.
    ///
    /// With templates: each referenced product id is resolved to its
    /// current name (the id itself stands in for rows that no longer
    /// resolve). Without templates: a generic plan with one
    /// self-referencing line per numbered session.
    fn build_session_plans(&self, treatment_id: &str, total_sessions: u32) -> Vec<SessionPlan> {
        let product = match self.product(treatment_id) {
            Some(p) => p,
            None => return Vec::new(),
        };

        if let Some(templates) = &product.session_details {
            templates
                .iter()
                .map(|template| SessionPlan {
                    session_number: template.session_number,
                    items: template
                        .items
                        .iter()
                        .map(|item| SessionItem {
                            product_id: item.product_id.clone(),
                            name: self
                                .product(&item.product_id)
                                .map(|p| p.name.clone())
                                .unwrap_or_else(|| item.product_id.clone()),
                            quantity: item.quantity,
                        })
                        .collect(),
                })
                .collect()
        } else {
            (1..=total_sessions)
                .map(|n| SessionPlan {
                    session_number: n,
                    items: vec![SessionItem {
                        product_id: product.id.clone(),
                        name: product.name.clone(),
                        quantity: 1,
                    }],
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::CreateOrderInput;
    use crate::testing::{
        store_with_products, test_service, test_treatment, test_treatment_with_template,
    };
    use lotus_core::CoreError;
    use crate::error::StoreError;

    /// Sells one unit of the given treatment to a fixed customer and
    /// returns the created package id.
    fn sell_treatment(store: &mut Store, treatment_id: &str) -> String {
        let treatment = store.product(treatment_id).unwrap().clone();
        store.cart.add_item(&treatment, 1).unwrap();
        store
            .create_order(CreateOrderInput {
                customer_name: Some("Lan Pham".to_string()),
                customer_phone: Some("0912345678".to_string()),
                ..CreateOrderInput::default()
            })
            .unwrap();
        store.packages().last().unwrap().id.clone()
    }

    #[test]
    fn test_use_and_return_keep_invariant() {
        let mut store = store_with_products(vec![test_treatment("t1", 50_000, 5)]);
        let pkg_id = sell_treatment(&mut store, "t1");

        store.use_package_session(&pkg_id, 1).unwrap();
        store.use_package_session(&pkg_id, 3).unwrap();
        assert!(store.return_package_session(&pkg_id, 1).unwrap());
        store.use_package_session(&pkg_id, 5).unwrap();
        assert!(!store.return_package_session(&pkg_id, 2).unwrap());

        let pkg = store.package(&pkg_id).unwrap();
        assert!(pkg.invariant_holds());
        assert_eq!(pkg.remaining_sessions, 3);
        assert_eq!(pkg.used_session_numbers, vec![3, 5]);
    }

    #[test]
    fn test_use_session_guards() {
        let mut store = store_with_products(vec![test_treatment("t1", 50_000, 2)]);
        let pkg_id = sell_treatment(&mut store, "t1");

        store.use_package_session(&pkg_id, 1).unwrap();
        assert!(matches!(
            store.use_package_session(&pkg_id, 1).unwrap_err(),
            StoreError::Core(CoreError::DuplicateSessionUse { .. })
        ));
        assert!(matches!(
            store.use_package_session(&pkg_id, 9).unwrap_err(),
            StoreError::Core(CoreError::SessionNumberOutOfRange { .. })
        ));
        assert!(store.use_package_session("missing", 1).is_err());
    }

    #[test]
    fn test_exhausted_package_goes_inactive() {
        let mut store = store_with_products(vec![test_treatment("t1", 50_000, 2)]);
        let pkg_id = sell_treatment(&mut store, "t1");
        let customer_id = store.package(&pkg_id).unwrap().customer_id.clone();

        store.use_package_session(&pkg_id, 1).unwrap();
        store.use_package_session(&pkg_id, 2).unwrap();

        assert!(!store.package(&pkg_id).unwrap().is_active);
        assert!(store.customer_active_packages(&customer_id).is_empty());

        store.return_package_session(&pkg_id, 2).unwrap();
        assert_eq!(store.customer_active_packages(&customer_id).len(), 1);
    }

    #[test]
    fn test_session_plans_resolved_from_templates() {
        let mut store = store_with_products(vec![test_service("svc-massage", 30_000)]);
        store.products.push(test_treatment_with_template(
            "t1",
            80_000,
            vec![(1, vec![("svc-massage", 1)]), (2, vec![("svc-massage", 2)])],
        ));
        let pkg_id = sell_treatment(&mut store, "t1");

        let pkg = store.package(&pkg_id).unwrap();
        assert_eq!(pkg.sessions.len(), 2);
        assert_eq!(pkg.sessions[0].items[0].product_id, "svc-massage");
        // Name resolved from the catalog, frozen on the plan.
        assert_eq!(pkg.sessions[0].items[0].name, "Product svc-massage");
        assert_eq!(pkg.sessions[1].items[0].quantity, 2);
    }

    #[test]
    fn test_generic_plan_when_no_templates() {
        let mut store = store_with_products(vec![test_treatment("t1", 50_000, 3)]);
        let pkg_id = sell_treatment(&mut store, "t1");

        let pkg = store.package(&pkg_id).unwrap();
        assert_eq!(pkg.sessions.len(), 3);
        for (i, plan) in pkg.sessions.iter().enumerate() {
            assert_eq!(plan.session_number, i as u32 + 1);
            assert_eq!(plan.items.len(), 1);
            assert_eq!(plan.items[0].product_id, "t1");
        }
    }

    #[test]
    fn test_package_for_service_traverses_session_items() {
        let mut store = store_with_products(vec![test_service("svc-facial", 30_000)]);
        store.products.push(test_treatment_with_template(
            "t1",
            80_000,
            vec![(1, vec![("svc-facial", 1)])],
        ));
        let pkg_id = sell_treatment(&mut store, "t1");
        let customer_id = store.package(&pkg_id).unwrap().customer_id.clone();

        assert!(store
            .package_for_service(&customer_id, "svc-facial")
            .is_some());
        assert!(store.package_for_service(&customer_id, "svc-other").is_none());

        // Once the covering session is used, the package no longer serves
        // that service.
        store.use_package_session(&pkg_id, 1).unwrap();
        assert!(store
            .package_for_service(&customer_id, "svc-facial")
            .is_none());
    }
}
