//! # Order Fulfillment Pipeline
//!
//! Turns the current cart plus order metadata into a persisted order and
//! applies every downstream effect in one synchronous state transition.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create_order()                                       │
//! │                                                                         │
//! │  VALIDATE (no collection touched yet)                                  │
//! │  ├── cart not empty                                                    │
//! │  ├── combined discount ≤ subtotal                                      │
//! │  └── every stocked line has stock ≥ quantity                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  APPLY (cannot fail past this point)                                   │
//! │  ├── 1. totals + seed payment event                                    │
//! │  ├── 2. resolve/create customer, bump spend aggregates                 │
//! │  ├── 3. persist order (prepended), clear cart                          │
//! │  ├── 4. decrement stock per stocked line                               │
//! │  ├── 5. materialize one treatment package per unit sold                │
//! │  └── 6. bump open-shift counters (tolerated if no shift is open)       │
//! │                                                                         │
//! │  A rejected call leaves every collection exactly as it found it.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use lotus_core::validation::validate_discount;
use lotus_core::{
    CoreError, Order, OrderItem, OrderStatus, PaymentEvent, PaymentMethod, ProductType,
};

use crate::error::StoreResult;
use crate::state::Store;

/// Metadata accompanying a checkout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    /// Order-level discount on top of the per-line discounts.
    #[serde(default)]
    pub discount_cents: i64,
    /// Cash handed over; defaults to the order total.
    #[serde(default)]
    pub received_cents: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

impl Store {
    /// Submits the current cart as a completed order.
    ///
    /// All rejection conditions are checked up front; on success the
    /// order is prepended to the order list, the cart is cleared, stock
    /// is decremented, the customer is resolved (created if needed) and
    /// their spend aggregates bumped, treatment packages materialize one
    /// per unit sold, and the open shift's counters move.
    pub fn create_order(&mut self, input: CreateOrderInput) -> StoreResult<Order> {
        // ---- validate ------------------------------------------------------
        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let subtotal = self.cart.subtotal_cents();
        let discount = self.cart.line_discount_cents() + input.discount_cents;
        validate_discount(discount, subtotal)?;

        for line in &self.cart.items {
            let product = self.product_ref(&line.product_id)?;
            if !product.can_fulfill(line.quantity) {
                return Err(CoreError::InsufficientStock {
                    name: product.name.clone(),
                    available: product.stock,
                    requested: line.quantity,
                }
                .into());
            }
        }

        // ---- apply ---------------------------------------------------------
        let total = subtotal - discount;
        let received = input.received_cents.unwrap_or(total);
        let now = Utc::now();

        let seed_payment = PaymentEvent {
            amount_cents: total,
            received_cents: received,
            change_cents: received - total,
            method: input.payment_method.unwrap_or_default(),
            paid_at: now,
        };

        let items: Vec<OrderItem> = self
            .cart
            .items
            .iter()
            .map(|line| OrderItem {
                product_id: line.product_id.clone(),
                name_snapshot: line.name.clone(),
                product_type: line.product_type,
                unit_price_cents: line.unit_price_cents,
                quantity: line.quantity,
                discount_cents: line.discount_cents,
                line_total_cents: line.line_total_cents(),
            })
            .collect();

        let customer_id = self.resolve_order_customer(
            input.customer_name.as_deref(),
            input.customer_phone.as_deref(),
            total,
        );

        let shift_id = match self.current_shift.clone() {
            Some(id) => Some(id),
            None => {
                warn!("Order created with no open shift; counters untouched");
                None
            }
        };

        let order = Order {
            id: Uuid::new_v4().to_string(),
            tenant_id: self.config.tenant_id.clone(),
            status: OrderStatus::Completed,
            items,
            subtotal_cents: subtotal,
            discount_cents: discount,
            total_cents: total,
            payment_method: input.payment_method.unwrap_or_default(),
            customer_id: customer_id.clone(),
            customer_name: input.customer_name,
            customer_phone: input.customer_phone,
            note: input.note,
            shift_id: shift_id.clone(),
            payment_history: vec![seed_payment],
            created_at: now,
        };

        // Newest first; the sale screen shows the head of the list.
        self.orders.insert(0, order.clone());

        let cart_lines: Vec<_> = self.cart.items.drain(..).collect();

        for line in &cart_lines {
            if line.product_type == ProductType::Product {
                // Validated above; the product cannot have vanished since.
                self.adjust_stock(&line.product_id, -line.quantity)?;
            }
        }

        for line in &cart_lines {
            if line.product_type == ProductType::Treatment {
                self.materialize_packages(&order.id, customer_id.as_deref(), line)?;
            }
        }

        if let Some(shift_id) = shift_id {
            if let Some(shift) = self.shifts.iter_mut().find(|s| s.id == shift_id) {
                shift.total_orders += 1;
                shift.total_revenue_cents += total;
            }
        }

        info!(
            order_id = %order.id,
            total = %total,
            items = order.items.len(),
            customer = customer_id.as_deref().unwrap_or("-"),
            "Order created"
        );

        Ok(order)
    }

    /// Parks the current cart as a held order: a snapshot with totals but
    /// no stock movement, no packages, no shift counters. The cart is
    /// cleared so the cashier can serve the next customer.
    pub fn hold_order(&mut self, note: Option<String>) -> StoreResult<Order> {
        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let subtotal = self.cart.subtotal_cents();
        let discount = self.cart.line_discount_cents();

        let items: Vec<OrderItem> = self
            .cart
            .items
            .drain(..)
            .map(|line| OrderItem {
                line_total_cents: line.unit_price_cents * line.quantity,
                product_id: line.product_id,
                name_snapshot: line.name,
                product_type: line.product_type,
                unit_price_cents: line.unit_price_cents,
                quantity: line.quantity,
                discount_cents: line.discount_cents,
            })
            .collect();

        let order = Order {
            id: Uuid::new_v4().to_string(),
            tenant_id: self.config.tenant_id.clone(),
            status: OrderStatus::Held,
            items,
            subtotal_cents: subtotal,
            discount_cents: discount,
            total_cents: subtotal - discount,
            payment_method: PaymentMethod::Cash,
            customer_id: None,
            customer_name: None,
            customer_phone: None,
            note,
            shift_id: None,
            payment_history: Vec::new(),
            created_at: Utc::now(),
        };

        debug!(order_id = %order.id, "Order held");
        self.orders.insert(0, order.clone());
        Ok(order)
    }

    /// All orders, newest first.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Looks up an order by id.
    pub fn order(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Resolves the order's customer: match by phone, else create a
    /// minimal record when both name and phone were given. Bumps the
    /// resolved customer's spend aggregates.
    fn resolve_order_customer(
        &mut self,
        name: Option<&str>,
        phone: Option<&str>,
        total_cents: i64,
    ) -> Option<String> {
        let phone = phone.map(str::trim).filter(|p| !p.is_empty())?;

        let existing = self.customers.iter().position(|c| c.phone == phone);
        let idx = match existing {
            Some(idx) => idx,
            None => {
                let name = name.map(str::trim).filter(|n| !n.is_empty())?;
                let customer = self.insert_walk_in_customer(name, phone);
                debug!(customer_id = %customer, phone = %phone, "Walk-in customer created");
                self.customers.len() - 1
            }
        };

        let customer = &mut self.customers[idx];
        customer.total_spent_cents += total_cents;
        customer.total_orders += 1;
        customer.updated_at = Utc::now();
        Some(customer.id.clone())
    }
}
