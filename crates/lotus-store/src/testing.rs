//! Shared test fixtures for the store modules.
//!
//! Compiled only for tests; keeps the entity literals in one place so the
//! operation tests stay focused on behavior.

use chrono::Utc;

use lotus_core::{Product, ProductType, SessionTemplate, SessionTemplateItem, DEFAULT_TENANT_ID};

use crate::state::Store;

/// A retail product with stock 100.
pub(crate) fn test_product(id: &str, price_cents: i64) -> Product {
    Product {
        id: id.to_string(),
        tenant_id: DEFAULT_TENANT_ID.to_string(),
        sku: format!("SKU-{}", id),
        barcode: None,
        name: format!("Product {}", id),
        category: "retail".to_string(),
        price_cents,
        stock: 100,
        product_type: ProductType::Product,
        sessions: None,
        session_details: None,
        deleted_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// A service row (no stock tracking).
pub(crate) fn test_service(id: &str, price_cents: i64) -> Product {
    Product {
        product_type: ProductType::Service,
        stock: 0,
        category: "service".to_string(),
        ..test_product(id, price_cents)
    }
}

/// A treatment product with the given session count and no templates.
pub(crate) fn test_treatment(id: &str, price_cents: i64, sessions: u32) -> Product {
    Product {
        product_type: ProductType::Treatment,
        stock: 0,
        category: "treatment".to_string(),
        sessions: Some(sessions),
        ..test_product(id, price_cents)
    }
}

/// A treatment whose sessions consume other catalog rows.
pub(crate) fn test_treatment_with_template(
    id: &str,
    price_cents: i64,
    template: Vec<(u32, Vec<(&str, i64)>)>,
) -> Product {
    let sessions = template.len() as u32;
    Product {
        product_type: ProductType::Treatment,
        stock: 0,
        category: "treatment".to_string(),
        sessions: Some(sessions),
        session_details: Some(
            template
                .into_iter()
                .map(|(session_number, items)| SessionTemplate {
                    session_number,
                    items: items
                        .into_iter()
                        .map(|(product_id, quantity)| SessionTemplateItem {
                            product_id: product_id.to_string(),
                            quantity,
                        })
                        .collect(),
                })
                .collect(),
        ),
        ..test_product(id, price_cents)
    }
}

/// A store pre-seeded with the given products.
pub(crate) fn store_with_products(products: Vec<Product>) -> Store {
    let mut store = Store::new();
    store.products = products;
    store
}
