//! # Cart
//!
//! The sale being assembled. Items snapshot product data at add time and
//! exist only until the cart is submitted (`create_order`) or parked
//! (`hold_order`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lotus_core::validation::validate_quantity;
use lotus_core::{CoreError, Product, ProductType, MAX_CART_ITEMS};

use crate::error::{StoreError, StoreResult};

/// An item in the shopping cart.
///
/// `product_id` references the catalog row; everything else is a frozen
/// copy taken when the item was added, so the cart displays consistent
/// data even if the product is edited mid-sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product ID (UUID)
    pub product_id: String,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Product kind at time of adding (frozen); treatment lines
    /// materialize packages at checkout
    pub product_type: ProductType,

    /// Price in cents at time of adding (frozen)
    pub unit_price_cents: i64,

    /// Quantity in cart
    pub quantity: i64,

    /// Per-unit discount in cents for this line
    pub discount_cents: i64,

    /// When this item was added to cart
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a new cart item from a product and quantity.
    ///
    /// The price is captured at this moment; later catalog edits do not
    /// reach lines already in the cart.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            product_type: product.product_type,
            unit_price_cents: product.price_cents,
            quantity,
            discount_cents: 0,
            added_at: Utc::now(),
        }
    }

    /// Line total before discounts (unit price × quantity).
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }

    /// Discount contributed by this line (per-unit discount × quantity).
    pub fn line_discount_cents(&self) -> i64 {
        self.discount_cents * self.quantity
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `product_id` (adding same product increases quantity)
/// - Quantity is positive (setting 0 removes the item)
/// - Maximum items: [`MAX_CART_ITEMS`]
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Items in the cart
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Adds a product to the cart or increases quantity if already present.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> StoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            validate_quantity(item.quantity + quantity)?;
            item.quantity += quantity;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            }
            .into());
        }

        self.items.push(CartItem::from_product(product, quantity));
        Ok(())
    }

    /// Updates the quantity of an item; 0 removes the line.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> StoreResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id);
        }
        validate_quantity(quantity)?;

        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| StoreError::not_found("Cart item", product_id))?;
        item.quantity = quantity;
        Ok(())
    }

    /// Sets the per-unit discount of a line.
    pub fn set_line_discount(&mut self, product_id: &str, discount_cents: i64) -> StoreResult<()> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| StoreError::not_found("Cart item", product_id))?;

        if discount_cents < 0 || discount_cents > item.unit_price_cents {
            return Err(lotus_core::ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: item.unit_price_cents,
            }
            .into());
        }

        item.discount_cents = discount_cents;
        Ok(())
    }

    /// Removes an item from the cart by product ID.
    pub fn remove_item(&mut self, product_id: &str) -> StoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == initial_len {
            Err(StoreError::not_found("Cart item", product_id))
        } else {
            Ok(())
        }
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the number of unique items in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity of all items.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Subtotal before any discount.
    pub fn subtotal_cents(&self) -> i64 {
        self.items.iter().map(|i| i.line_total_cents()).sum()
    }

    /// Sum of the per-line discounts (order-level discount excluded).
    pub fn line_discount_cents(&self) -> i64 {
        self.items.iter().map(|i| i.line_discount_cents()).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart totals summary for the sale screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
    pub line_discount_cents: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal_cents: cart.subtotal_cents(),
            line_discount_cents: cart.line_discount_cents(),
        }
    }
}
