//! # Stock Receipt Ledger
//!
//! Stock-in and stock-out receipts that move product on-hand quantity.
//!
//! ## Edit Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              update_stock_receipt()                                     │
//! │                                                                         │
//! │  stock: 100 ──► create IN qty 10 ──► stock: 110                        │
//! │                      │                                                  │
//! │                      ▼  edit to qty 4                                   │
//! │          1. REVERSE the old effect   (110 - 10 = 100)                  │
//! │          2. APPLY the new effect     (100 +  4 = 104)                  │
//! │                                                                         │
//! │  Skipping step 1 would leave 114 and every further edit would drift    │
//! │  stock further. Reverse-then-reapply keeps edits idempotent.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation is all-or-nothing: a receipt that would drive any
//! product's stock below zero is rejected before anything moves.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use lotus_core::validation::{validate_amount_cents, validate_quantity};
use lotus_core::{
    CoreError, ReceiptItem, ReceiptKind, StockReceipt, ValidationError, RECEIPT_SEQUENCE_DIGITS,
};

use crate::error::{StoreError, StoreResult};
use crate::state::Store;

/// One input line of a stock receipt; the product name is resolved and
/// frozen by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItemInput {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// Input for posting or editing a stock receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockReceiptInput {
    /// Supplier for stock-in, reason for stock-out.
    #[serde(default)]
    pub note: Option<String>,
    pub items: Vec<ReceiptItemInput>,
}

impl Store {
    /// Posts a stock receipt and applies each line once to product stock.
    pub fn create_stock_receipt(
        &mut self,
        kind: ReceiptKind,
        input: StockReceiptInput,
    ) -> StoreResult<StockReceipt> {
        self.validate_receipt_lines(&input)?;
        self.check_resulting_stock(kind, None, &input.items)?;

        let items = self.resolve_receipt_items(&input.items)?;
        let (total_quantity, total_cost_cents) = StockReceipt::compute_totals(&items);

        let receipt = StockReceipt {
            id: Uuid::new_v4().to_string(),
            tenant_id: self.config.tenant_id.clone(),
            kind,
            number: self.next_receipt_number(kind),
            note: input.note,
            items,
            total_quantity,
            total_cost_cents,
            created_at: Utc::now(),
        };

        for item in &receipt.items {
            self.adjust_stock(&item.product_id, kind.sign() * item.quantity)?;
        }

        info!(
            receipt_id = %receipt.id,
            number = %receipt.number,
            kind = ?kind,
            lines = receipt.items.len(),
            "Stock receipt posted"
        );
        self.receipts.push(receipt.clone());
        Ok(receipt)
    }

    /// Edits a receipt: reverses the original stock effect, then applies
    /// the new one. The receipt keeps its number and posting date.
    pub fn update_stock_receipt(
        &mut self,
        id: &str,
        input: StockReceiptInput,
    ) -> StoreResult<StockReceipt> {
        self.validate_receipt_lines(&input)?;

        let old = self
            .receipts
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Receipt", id))?;
        self.check_resulting_stock(old.kind, Some(&old), &input.items)?;

        // Reverse the old effect...
        for item in &old.items {
            self.adjust_stock(&item.product_id, -old.kind.sign() * item.quantity)?;
        }
        // ...then apply the new one.
        let items = self.resolve_receipt_items(&input.items)?;
        for item in &items {
            self.adjust_stock(&item.product_id, old.kind.sign() * item.quantity)?;
        }

        let (total_quantity, total_cost_cents) = StockReceipt::compute_totals(&items);
        let receipt = self
            .receipts
            .iter_mut()
            .find(|r| r.id == id)
            .expect("receipt vanished during update");
        receipt.note = input.note;
        receipt.items = items;
        receipt.total_quantity = total_quantity;
        receipt.total_cost_cents = total_cost_cents;

        info!(receipt_id = %id, number = %receipt.number, "Stock receipt updated");
        Ok(receipt.clone())
    }

    /// Deletes a receipt, reversing its stock effect.
    pub fn delete_stock_receipt(&mut self, id: &str) -> StoreResult<()> {
        let receipt = self
            .receipts
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Receipt", id))?;
        // An empty new-item list makes the check pure reversal.
        self.check_resulting_stock(receipt.kind, Some(&receipt), &[])?;

        for item in &receipt.items {
            self.adjust_stock(&item.product_id, -receipt.kind.sign() * item.quantity)?;
        }
        self.receipts.retain(|r| r.id != id);

        info!(receipt_id = %id, number = %receipt.number, "Stock receipt deleted");
        Ok(())
    }

    /// All receipts, in posting order.
    pub fn stock_receipts(&self) -> &[StockReceipt] {
        &self.receipts
    }

    /// Looks up a receipt by id.
    pub fn stock_receipt(&self, id: &str) -> Option<&StockReceipt> {
        self.receipts.iter().find(|r| r.id == id)
    }

    /// Next receipt number for the kind: `IN-YYYYMMDD-NNN`, sequence =
    /// count of same-kind receipts already carrying today's date prefix,
    /// plus one. The sequence resets every calendar day.
    fn next_receipt_number(&self, kind: ReceiptKind) -> String {
        let prefix = format!("{}-{}-", kind.prefix(), Utc::now().format("%Y%m%d"));
        let seq = self
            .receipts
            .iter()
            .filter(|r| r.kind == kind && r.number.starts_with(&prefix))
            .count()
            + 1;

        format!("{}{:0width$}", prefix, seq, width = RECEIPT_SEQUENCE_DIGITS)
    }

    fn validate_receipt_lines(&self, input: &StockReceiptInput) -> StoreResult<()> {
        if input.items.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            }
            .into());
        }
        for line in &input.items {
            self.product_ref(&line.product_id)?;
            validate_quantity(line.quantity)?;
            validate_amount_cents("unit price", line.unit_price_cents)?;
        }
        Ok(())
    }

    /// Rejects the operation if any product would end below zero after
    /// reversing `old` (when given) and applying the new lines.
    fn check_resulting_stock(
        &self,
        kind: ReceiptKind,
        old: Option<&StockReceipt>,
        new_items: &[ReceiptItemInput],
    ) -> StoreResult<()> {
        // product id -> net delta over reverse + apply
        let mut deltas: Vec<(String, i64)> = Vec::new();
        let bump = |product_id: &str, delta: i64, deltas: &mut Vec<(String, i64)>| {
            match deltas.iter_mut().find(|(id, _)| id.as_str() == product_id) {
                Some((_, d)) => *d += delta,
                None => deltas.push((product_id.to_string(), delta)),
            }
        };

        if let Some(old) = old {
            for item in &old.items {
                bump(&item.product_id, -kind.sign() * item.quantity, &mut deltas);
            }
        }
        for line in new_items {
            bump(&line.product_id, kind.sign() * line.quantity, &mut deltas);
        }

        for (product_id, delta) in &deltas {
            let product = self.product_ref(product_id)?;
            if product.tracks_stock() && product.stock + delta < 0 {
                return Err(CoreError::InsufficientStock {
                    name: product.name.clone(),
                    available: product.stock,
                    requested: -delta,
                }
                .into());
            }
        }
        Ok(())
    }

    fn resolve_receipt_items(&self, lines: &[ReceiptItemInput]) -> StoreResult<Vec<ReceiptItem>> {
        lines
            .iter()
            .map(|line| {
                let product = self.product_ref(&line.product_id)?;
                Ok(ReceiptItem {
                    product_id: line.product_id.clone(),
                    name: product.name.clone(),
                    quantity: line.quantity,
                    unit_price_cents: line.unit_price_cents,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{store_with_products, test_product};

    fn lines(entries: &[(&str, i64)]) -> StockReceiptInput {
        StockReceiptInput {
            note: None,
            items: entries
                .iter()
                .map(|(id, qty)| ReceiptItemInput {
                    product_id: id.to_string(),
                    quantity: *qty,
                    unit_price_cents: 1000,
                })
                .collect(),
        }
    }

    #[test]
    fn test_stock_in_adds_stock() {
        let mut store = store_with_products(vec![test_product("p1", 1000)]);
        let receipt = store
            .create_stock_receipt(ReceiptKind::In, lines(&[("p1", 25)]))
            .unwrap();

        assert_eq!(store.product("p1").unwrap().stock, 125);
        assert_eq!(receipt.total_quantity, 25);
        assert_eq!(receipt.total_cost_cents, 25_000);
        assert_eq!(receipt.items[0].name, "Product p1");
    }

    #[test]
    fn test_stock_out_subtracts_and_rejects_oversell() {
        let mut store = store_with_products(vec![test_product("p1", 1000)]);
        store
            .create_stock_receipt(ReceiptKind::Out, lines(&[("p1", 40)]))
            .unwrap();
        assert_eq!(store.product("p1").unwrap().stock, 60);

        // 70 > 60 on hand: the whole receipt is rejected, nothing moves.
        let err = store
            .create_stock_receipt(ReceiptKind::Out, lines(&[("p1", 70)]))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::InsufficientStock { .. })
        ));
        assert_eq!(store.product("p1").unwrap().stock, 60);
        assert_eq!(store.stock_receipts().len(), 1);
    }

    #[test]
    fn test_oversell_check_accumulates_duplicate_lines() {
        let mut store = store_with_products(vec![test_product("p1", 1000)]);
        // Two lines of 60 each: individually fine, together over the 100.
        let err = store
            .create_stock_receipt(ReceiptKind::Out, lines(&[("p1", 60), ("p1", 60)]))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::InsufficientStock { .. })
        ));
        assert_eq!(store.product("p1").unwrap().stock, 100);
    }

    #[test]
    fn test_receipt_numbering_resets_per_kind() {
        let mut store = store_with_products(vec![test_product("p1", 1000)]);
        let today = Utc::now().format("%Y%m%d").to_string();

        let r1 = store
            .create_stock_receipt(ReceiptKind::In, lines(&[("p1", 1)]))
            .unwrap();
        let r2 = store
            .create_stock_receipt(ReceiptKind::In, lines(&[("p1", 1)]))
            .unwrap();
        let r3 = store
            .create_stock_receipt(ReceiptKind::In, lines(&[("p1", 1)]))
            .unwrap();
        let out = store
            .create_stock_receipt(ReceiptKind::Out, lines(&[("p1", 1)]))
            .unwrap();

        assert_eq!(r1.number, format!("IN-{}-001", today));
        assert_eq!(r2.number, format!("IN-{}-002", today));
        assert_eq!(r3.number, format!("IN-{}-003", today));
        // OUT sequence counts separately.
        assert_eq!(out.number, format!("OUT-{}-001", today));
    }

    #[test]
    fn test_edit_is_idempotent_on_stock() {
        let mut store = store_with_products(vec![test_product("p1", 1000)]);
        let receipt = store
            .create_stock_receipt(ReceiptKind::In, lines(&[("p1", 10)]))
            .unwrap();
        assert_eq!(store.product("p1").unwrap().stock, 110);

        // Editing 10 -> 4 must land at initial + 4, not initial + 14.
        let updated = store
            .update_stock_receipt(&receipt.id, lines(&[("p1", 4)]))
            .unwrap();
        assert_eq!(store.product("p1").unwrap().stock, 104);
        assert_eq!(updated.total_quantity, 4);
        // Number survives the edit.
        assert_eq!(updated.number, receipt.number);

        // A second edit of the same receipt stays drift-free.
        store
            .update_stock_receipt(&receipt.id, lines(&[("p1", 9)]))
            .unwrap();
        assert_eq!(store.product("p1").unwrap().stock, 109);
    }

    #[test]
    fn test_update_stock_out_reverses_before_applying() {
        let mut store = store_with_products(vec![test_product("p1", 1000)]);
        let receipt = store
            .create_stock_receipt(ReceiptKind::Out, lines(&[("p1", 80)]))
            .unwrap();
        assert_eq!(store.product("p1").unwrap().stock, 20);

        // 90 out would be impossible against the current 20, but after
        // reversing the original 80 the stock is 100 again.
        store
            .update_stock_receipt(&receipt.id, lines(&[("p1", 90)]))
            .unwrap();
        assert_eq!(store.product("p1").unwrap().stock, 10);

        // 110 exceeds even the reversed stock: rejected, nothing moves.
        let err = store
            .update_stock_receipt(&receipt.id, lines(&[("p1", 110)]))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::InsufficientStock { .. })
        ));
        assert_eq!(store.product("p1").unwrap().stock, 10);
    }

    #[test]
    fn test_delete_reverses_effect() {
        let mut store = store_with_products(vec![test_product("p1", 1000)]);
        let receipt = store
            .create_stock_receipt(ReceiptKind::Out, lines(&[("p1", 30)]))
            .unwrap();
        assert_eq!(store.product("p1").unwrap().stock, 70);

        store.delete_stock_receipt(&receipt.id).unwrap();
        assert_eq!(store.product("p1").unwrap().stock, 100);
        assert!(store.stock_receipts().is_empty());
    }

    #[test]
    fn test_delete_stock_in_cannot_strand_negative_stock() {
        let mut store = store_with_products(vec![{
            let mut p = test_product("p1", 1000);
            p.stock = 0;
            p
        }]);
        let receipt = store
            .create_stock_receipt(ReceiptKind::In, lines(&[("p1", 50)]))
            .unwrap();
        // The received goods were sold down to 30.
        store.adjust_stock("p1", -20).unwrap();

        let err = store.delete_stock_receipt(&receipt.id).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::InsufficientStock { .. })
        ));
        assert_eq!(store.product("p1").unwrap().stock, 30);
    }

    #[test]
    fn test_missing_receipt_is_an_error() {
        let mut store = store_with_products(vec![test_product("p1", 1000)]);
        assert!(matches!(
            store
                .update_stock_receipt("nope", lines(&[("p1", 1)]))
                .unwrap_err(),
            StoreError::NotFound { .. }
        ));
        assert!(matches!(
            store.delete_stock_receipt("nope").unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[test]
    fn test_empty_receipt_rejected() {
        let mut store = store_with_products(vec![test_product("p1", 1000)]);
        assert!(store
            .create_stock_receipt(ReceiptKind::In, lines(&[]))
            .is_err());
    }
}
