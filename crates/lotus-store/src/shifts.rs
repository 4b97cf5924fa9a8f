//! # Shifts
//!
//! Cashier open-to-close sessions. At most one shift is open at a time;
//! the order pipeline bumps the open shift's counters and `close_shift`
//! settles the drawer:
//!
//! ```text
//! expected_cash = opening_cash + total_revenue
//! difference    = closing_cash - expected_cash   (negative = short)
//! ```

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use lotus_core::validation::validate_amount_cents;
use lotus_core::{CoreError, Shift, ShiftStatus};

use crate::error::StoreResult;
use crate::state::Store;

impl Store {
    /// Opens a shift. Exactly one shift may be open; a second open is
    /// rejected with `ShiftAlreadyOpen`.
    pub fn open_shift(&mut self, cashier_id: &str, opening_cash_cents: i64) -> StoreResult<Shift> {
        validate_amount_cents("opening cash", opening_cash_cents)?;

        if let Some(open) = self.current_shift() {
            return Err(CoreError::ShiftAlreadyOpen {
                shift_id: open.id.clone(),
            }
            .into());
        }

        let shift = Shift {
            id: Uuid::new_v4().to_string(),
            tenant_id: self.config.tenant_id.clone(),
            cashier_id: cashier_id.to_string(),
            status: ShiftStatus::Open,
            opening_cash_cents,
            closing_cash_cents: None,
            expected_cash_cents: None,
            difference_cents: None,
            total_orders: 0,
            total_revenue_cents: 0,
            opened_at: Utc::now(),
            closed_at: None,
        };

        info!(shift_id = %shift.id, cashier = %cashier_id, opening = %opening_cash_cents, "Shift opened");
        self.current_shift = Some(shift.id.clone());
        self.shifts.push(shift.clone());
        Ok(shift)
    }

    /// Closes the open shift against the counted drawer cash.
    pub fn close_shift(&mut self, closing_cash_cents: i64) -> StoreResult<Shift> {
        validate_amount_cents("closing cash", closing_cash_cents)?;

        let shift_id = self
            .current_shift
            .clone()
            .ok_or(CoreError::NoActiveShift)?;
        let shift = self
            .shifts
            .iter_mut()
            .find(|s| s.id == shift_id)
            .ok_or(CoreError::NoActiveShift)?;

        let expected = shift.opening_cash_cents + shift.total_revenue_cents;
        shift.status = ShiftStatus::Closed;
        shift.closing_cash_cents = Some(closing_cash_cents);
        shift.expected_cash_cents = Some(expected);
        shift.difference_cents = Some(closing_cash_cents - expected);
        shift.closed_at = Some(Utc::now());

        let closed = shift.clone();
        self.current_shift = None;

        info!(
            shift_id = %closed.id,
            expected = %expected,
            counted = %closing_cash_cents,
            difference = %closed.difference_cents.unwrap_or(0),
            "Shift closed"
        );
        Ok(closed)
    }

    /// The currently open shift, if any.
    pub fn current_shift(&self) -> Option<&Shift> {
        let id = self.current_shift.as_deref()?;
        self.shifts.iter().find(|s| s.id == id && s.is_open())
    }

    /// All shifts, oldest first.
    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn test_open_and_close_shift() {
        let mut store = Store::new();
        let shift = store.open_shift("cashier-1", 50_000).unwrap();
        assert!(store.current_shift().is_some());

        // Simulate a day of sales recorded by the pipeline.
        store
            .shifts
            .iter_mut()
            .find(|s| s.id == shift.id)
            .unwrap()
            .total_revenue_cents = 120_000;

        let closed = store.close_shift(168_000).unwrap();
        assert_eq!(closed.expected_cash_cents, Some(170_000));
        assert_eq!(closed.difference_cents, Some(-2_000)); // drawer short
        assert_eq!(closed.status, ShiftStatus::Closed);
        assert!(store.current_shift().is_none());
    }

    #[test]
    fn test_only_one_open_shift() {
        let mut store = Store::new();
        store.open_shift("cashier-1", 0).unwrap();

        let err = store.open_shift("cashier-2", 0).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::ShiftAlreadyOpen { .. })
        ));
    }

    #[test]
    fn test_close_without_open_shift() {
        let mut store = Store::new();
        assert!(matches!(
            store.close_shift(0).unwrap_err(),
            StoreError::Core(CoreError::NoActiveShift)
        ));
    }

    #[test]
    fn test_reopen_after_close() {
        let mut store = Store::new();
        store.open_shift("cashier-1", 0).unwrap();
        store.close_shift(0).unwrap();

        store.open_shift("cashier-2", 10_000).unwrap();
        assert_eq!(store.shifts().len(), 2);
        assert_eq!(store.current_shift().unwrap().cashier_id, "cashier-2");
    }
}
