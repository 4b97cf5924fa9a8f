//! # Customers
//!
//! Customer records and phone lookup. The spend aggregates
//! (`total_spent_cents`, `total_orders`) are owned by the order pipeline;
//! nothing here touches them.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use lotus_core::validation::{validate_name, validate_phone};
use lotus_core::Customer;

use crate::error::{StoreError, StoreResult};
use crate::state::Store;

/// Input for creating or editing a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Store {
    /// Creates a customer record.
    pub fn add_customer(&mut self, input: CustomerInput) -> StoreResult<Customer> {
        validate_name(&input.name)?;
        validate_phone(&input.phone)?;

        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            tenant_id: self.config.tenant_id.clone(),
            name: input.name,
            phone: input.phone,
            email: input.email,
            total_spent_cents: 0,
            total_orders: 0,
            created_at: now,
            updated_at: now,
        };

        info!(customer_id = %customer.id, "Customer created");
        self.customers.push(customer.clone());
        Ok(customer)
    }

    /// Edits a customer's contact fields.
    pub fn update_customer(&mut self, id: &str, input: CustomerInput) -> StoreResult<Customer> {
        validate_name(&input.name)?;
        validate_phone(&input.phone)?;

        let customer = self
            .customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::not_found("Customer", id))?;
        customer.name = input.name;
        customer.phone = input.phone;
        customer.email = input.email;
        customer.updated_at = Utc::now();

        Ok(customer.clone())
    }

    /// All customers.
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// Looks up a customer by id.
    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    /// Looks up a customer by exact phone match.
    pub fn customer_by_phone(&self, phone: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.phone == phone)
    }

    /// Inserts the minimal walk-in record the order pipeline creates when
    /// a checkout names an unknown phone. Returns the new id.
    pub(crate) fn insert_walk_in_customer(&mut self, name: &str, phone: &str) -> String {
        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            tenant_id: self.config.tenant_id.clone(),
            name: name.to_string(),
            phone: phone.to_string(),
            email: None,
            total_spent_cents: 0,
            total_orders: 0,
            created_at: now,
            updated_at: now,
        };
        let id = customer.id.clone();
        self.customers.push(customer);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, phone: &str) -> CustomerInput {
        CustomerInput {
            name: name.to_string(),
            phone: phone.to_string(),
            email: None,
        }
    }

    #[test]
    fn test_add_and_find_by_phone() {
        let mut store = Store::new();
        let created = store.add_customer(input("Lan Pham", "0912345678")).unwrap();

        assert_eq!(
            store.customer_by_phone("0912345678").unwrap().id,
            created.id
        );
        assert!(store.customer_by_phone("0000000000").is_none());
    }

    #[test]
    fn test_add_customer_validates() {
        let mut store = Store::new();
        assert!(store.add_customer(input("", "0912345678")).is_err());
        assert!(store.add_customer(input("Lan Pham", "not a phone!")).is_err());
    }

    #[test]
    fn test_update_customer() {
        let mut store = Store::new();
        let created = store.add_customer(input("Lan Pham", "0912345678")).unwrap();

        let updated = store
            .update_customer(&created.id, input("Lan Pham", "0987654321"))
            .unwrap();
        assert_eq!(updated.phone, "0987654321");
        assert!(store.update_customer("missing", input("x", "1")).is_err());
    }
}
