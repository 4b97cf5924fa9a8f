//! # Product Catalog Operations
//!
//! CRUD over the product collection plus the stock-adjustment primitive
//! shared by the order pipeline and the receipt ledger.
//!
//! ## Key Operations
//! - Substring search across name, SKU, barcode
//! - Soft delete (rows are filtered from listings, kept for history)
//! - Stock adjustment with an explicit floor check at the call sites

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use lotus_core::validation::{validate_amount_cents, validate_name, validate_session_count};
use lotus_core::{Product, ProductType, SessionTemplate};

use crate::error::StoreResult;
use crate::state::Store;

/// Input for creating or updating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub sku: String,
    #[serde(default)]
    pub barcode: Option<String>,
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    #[serde(default)]
    pub stock: i64,
    pub product_type: ProductType,
    #[serde(default)]
    pub sessions: Option<u32>,
    #[serde(default)]
    pub session_details: Option<Vec<SessionTemplate>>,
}

impl ProductInput {
    fn validate(&self) -> StoreResult<()> {
        validate_name(&self.name)?;
        validate_amount_cents("price", self.price_cents)?;
        if self.product_type == ProductType::Treatment {
            validate_session_count(self.sessions.unwrap_or(0))?;
        }
        Ok(())
    }
}

impl Store {
    /// Creates a product.
    pub fn add_product(&mut self, input: ProductInput) -> StoreResult<Product> {
        input.validate()?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            tenant_id: self.config.tenant_id.clone(),
            sku: input.sku,
            barcode: input.barcode,
            name: input.name,
            category: input.category,
            price_cents: input.price_cents,
            stock: input.stock,
            product_type: input.product_type,
            sessions: input.sessions,
            session_details: input.session_details,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };

        info!(id = %product.id, name = %product.name, "Product created");
        self.products.push(product.clone());
        Ok(product)
    }

    /// Updates a product in place. Stock is intentionally NOT editable
    /// here: stock moves only through orders and receipts.
    pub fn update_product(&mut self, id: &str, input: ProductInput) -> StoreResult<Product> {
        input.validate()?;

        let product = self.product_mut(id)?;
        product.sku = input.sku;
        product.barcode = input.barcode;
        product.name = input.name;
        product.category = input.category;
        product.price_cents = input.price_cents;
        product.product_type = input.product_type;
        product.sessions = input.sessions;
        product.session_details = input.session_details;
        product.updated_at = Utc::now();

        debug!(id = %id, "Product updated");
        Ok(product.clone())
    }

    /// Soft-deletes a product. The row stays for order/receipt history
    /// but disappears from listings and search.
    pub fn remove_product(&mut self, id: &str) -> StoreResult<()> {
        let product = self.product_mut(id)?;
        product.deleted_at = Some(Utc::now());
        product.updated_at = Utc::now();

        info!(id = %id, "Product soft-deleted");
        Ok(())
    }

    /// Looks up a product by id, deleted rows included (history lookups
    /// need them).
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// All non-deleted products.
    pub fn products(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| !p.is_deleted()).collect()
    }

    /// Case-insensitive substring search across name, SKU, and barcode.
    ///
    /// An empty query returns all active products. Linear scan; the
    /// catalog of a single store is a few hundred rows.
    pub fn search_products(&self, query: &str) -> Vec<&Product> {
        let query = query.trim().to_lowercase();

        debug!(query = %query, "Searching products");
        if query.is_empty() {
            return self.products();
        }

        self.products
            .iter()
            .filter(|p| !p.is_deleted())
            .filter(|p| {
                p.name.to_lowercase().contains(&query)
                    || p.sku.to_lowercase().contains(&query)
                    || p.barcode
                        .as_deref()
                        .is_some_and(|b| b.to_lowercase().contains(&query))
            })
            .collect()
    }

    /// Applies a signed stock delta to a product. Callers check floors
    /// before calling; this primitive just moves the number.
    pub(crate) fn adjust_stock(&mut self, product_id: &str, delta: i64) -> StoreResult<()> {
        let product = self.product_mut(product_id)?;
        product.stock += delta;
        product.updated_at = Utc::now();

        debug!(product_id = %product_id, delta = %delta, stock = %product.stock, "Stock adjusted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{store_with_products, test_product};

    fn retail_input(name: &str) -> ProductInput {
        ProductInput {
            sku: "SKU-NEW".to_string(),
            barcode: Some("8934567000123".to_string()),
            name: name.to_string(),
            category: "retail".to_string(),
            price_cents: 2500,
            stock: 10,
            product_type: ProductType::Product,
            sessions: None,
            session_details: None,
        }
    }

    #[test]
    fn test_add_and_get_product() {
        let mut store = Store::new();
        let created = store.add_product(retail_input("Hair wax")).unwrap();

        assert_eq!(store.products().len(), 1);
        assert_eq!(store.product(&created.id).unwrap().name, "Hair wax");
    }

    #[test]
    fn test_add_product_validates() {
        let mut store = Store::new();
        assert!(store.add_product(retail_input("  ")).is_err());

        let mut bad_treatment = retail_input("Facial course");
        bad_treatment.product_type = ProductType::Treatment;
        bad_treatment.sessions = None;
        assert!(store.add_product(bad_treatment).is_err());
    }

    #[test]
    fn test_soft_delete_hides_from_listing() {
        let mut store = store_with_products(vec![test_product("p1", 1000)]);
        store.remove_product("p1").unwrap();

        assert!(store.products().is_empty());
        // Still reachable by id for history.
        assert!(store.product("p1").unwrap().is_deleted());
    }

    #[test]
    fn test_search_products() {
        let mut store = store_with_products(vec![test_product("p1", 1000)]);
        let mut named = test_product("p2", 2000);
        named.name = "Coconut Shampoo".to_string();
        store.products.push(named);

        assert_eq!(store.search_products("coconut").len(), 1);
        assert_eq!(store.search_products("SKU-p").len(), 2);
        assert_eq!(store.search_products("").len(), 2);
        assert!(store.search_products("zzz").is_empty());
    }

    #[test]
    fn test_adjust_stock() {
        let mut store = store_with_products(vec![test_product("p1", 1000)]);
        store.adjust_stock("p1", -30).unwrap();
        assert_eq!(store.product("p1").unwrap().stock, 70);

        store.adjust_stock("p1", 5).unwrap();
        assert_eq!(store.product("p1").unwrap().stock, 75);

        assert!(store.adjust_stock("missing", 1).is_err());
    }
}
