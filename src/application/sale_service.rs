use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::clock::Clock;
use crate::domain::errors::DomainError;
use crate::domain::ports::{SaleStore, SaleTransaction};
use crate::domain::sale::{ListResult, NewSale, NewSaleLineItem, SaleReceipt, SaleView};

pub const MAX_PAGE_SIZE: i64 = 100;

pub struct SaleService<S> {
    store: S,
}

impl<S: SaleStore> SaleService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persists `cart` as one sale plus one line per cart line, atomically.
    ///
    /// The cart is only borrowed: on failure it is left exactly as it was so
    /// the caller can retry, on success the caller discards it.
    pub fn commit_sale(&self, cart: &Cart, clock: &dyn Clock) -> Result<SaleReceipt, DomainError> {
        if cart.is_empty() {
            log::warn!("Rejected commit of empty cart {}", cart.sale_id());
            return Err(DomainError::EmptyCart);
        }

        let sale = NewSale {
            id: cart.sale_id(),
            sold_at: clock.now(),
            total: cart.total(),
        };
        let lines = NewSaleLineItem::from_cart(cart);

        let mut tx = self.store.begin_transaction()?;

        log::debug!("Saving sale {}", sale.id);
        if let Err(e) = tx.insert_sale(&sale) {
            log::error!("Failed to save sale {}, rolling back: {}", sale.id, e);
            tx.rollback();
            return Err(e);
        }

        log::debug!("Saving {} line items for sale {}", lines.len(), sale.id);
        if let Err(e) = tx.insert_sale_line_items(&lines) {
            log::error!(
                "Failed to save line items of sale {}, rolling back: {}",
                sale.id,
                e
            );
            tx.rollback();
            return Err(e);
        }

        if let Err(e) = tx.commit() {
            log::error!("Failed to commit sale {}: {}", sale.id, e);
            return Err(e);
        }

        log::info!(
            "Sale {} committed with {} line items, total {}",
            sale.id,
            lines.len(),
            sale.total
        );
        Ok(SaleReceipt {
            sale_id: sale.id,
            sold_at: sale.sold_at,
            total: sale.total,
            line_count: lines.len(),
        })
    }

    pub fn get_sale(&self, id: Uuid) -> Result<SaleView, DomainError> {
        self.store.find_by_id(id)?.ok_or(DomainError::NotFound)
    }

    /// Pages start at 1; `limit` is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn list_sales(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        self.store
            .list(page.max(1), limit.clamp(1, MAX_PAGE_SIZE))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::{NaiveDate, NaiveDateTime, Utc};

    use super::*;
    use crate::application::test_support::InMemorySaleStore;
    use crate::domain::clock::FixedClock;
    use crate::domain::medication::Medication;

    fn medication(name: &str, price: &str) -> Medication {
        Medication {
            id: Uuid::new_v4(),
            name: name.to_string(),
            unit_price: BigDecimal::from_str(price).expect("valid decimal"),
            available_quantity: 50,
            category_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 14)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn commit_writes_one_sale_and_one_line_per_cart_line() {
        let store = InMemorySaleStore::default();
        let service = SaleService::new(store.clone());
        let med_a = medication("Amoxicillin 500mg", "12.40");
        let med_b = medication("Loratadine 10mg", "4.20");

        let mut cart = Cart::new();
        cart.add_product(&med_a, 3).expect("valid add");
        cart.add_product(&med_b, 1).expect("valid add");
        assert_eq!(cart.item_count(), 2);

        let receipt = service
            .commit_sale(&cart, &FixedClock(noon()))
            .expect("commit failed");

        let state = store.snapshot();
        assert_eq!(state.sales.len(), 1);
        assert_eq!(state.sales[0].id, cart.sale_id());
        assert_eq!(state.sales[0].sold_at, noon());
        assert_eq!(state.sales[0].total, BigDecimal::from_str("41.40").expect("valid decimal"));
        assert_eq!(state.lines.len(), 2);
        assert!(state.lines.iter().all(|l| l.sale_id == cart.sale_id()));

        let qty_a = state.lines.iter().find(|l| l.medication_id == med_a.id).map(|l| l.quantity);
        let qty_b = state.lines.iter().find(|l| l.medication_id == med_b.id).map(|l| l.quantity);
        assert_eq!(qty_a, Some(3));
        assert_eq!(qty_b, Some(1));

        assert_eq!(receipt.sale_id, cart.sale_id());
        assert_eq!(receipt.line_count, 2);
        assert_eq!(state.commits, 1);
        assert_eq!(state.rollbacks, 0);
    }

    #[test]
    fn line_quantities_match_cart_quantities() {
        let store = InMemorySaleStore::default();
        let service = SaleService::new(store.clone());
        let med = medication("Paracetamol 500mg", "2.50");

        let mut cart = Cart::new();
        for quantity in [1, 4, 9, 2] {
            cart.add_product(&med, quantity).expect("valid add");
        }
        service
            .commit_sale(&cart, &FixedClock(noon()))
            .expect("commit failed");

        let state = store.snapshot();
        assert_eq!(state.lines.len(), cart.item_count());
        for line in cart.line_items() {
            let stored = state
                .lines
                .iter()
                .find(|l| l.id == line.id)
                .expect("line persisted");
            assert_eq!(stored.quantity, line.quantity);
        }
    }

    #[test]
    fn empty_cart_is_rejected_without_touching_storage() {
        let store = InMemorySaleStore::default();
        let service = SaleService::new(store.clone());

        let err = service
            .commit_sale(&Cart::new(), &FixedClock(noon()))
            .unwrap_err();

        assert!(matches!(err, DomainError::EmptyCart));
        let state = store.snapshot();
        assert_eq!(state.begin_calls, 0);
        assert!(state.sales.is_empty());
    }

    #[test]
    fn failed_line_insert_rolls_back_the_sale() {
        let store = InMemorySaleStore::default();
        store.fail_line_items(1);
        let service = SaleService::new(store.clone());
        let mut cart = Cart::new();
        cart.add_product(&medication("Omeprazole 20mg", "7.80"), 2)
            .expect("valid add");

        let err = service
            .commit_sale(&cart, &FixedClock(noon()))
            .unwrap_err();

        assert!(matches!(err, DomainError::Persistence(_)));
        let state = store.snapshot();
        assert!(state.sales.is_empty(), "sale row must not survive rollback");
        assert!(state.lines.is_empty());
        assert_eq!(state.rollbacks, 1);
        assert_eq!(state.commits, 0);
    }

    #[test]
    fn failed_sale_insert_rolls_back_before_lines_are_written() {
        let store = InMemorySaleStore::default();
        store.fail_sale_insert(1);
        let service = SaleService::new(store.clone());
        let mut cart = Cart::new();
        cart.add_product(&medication("Omeprazole 20mg", "7.80"), 2)
            .expect("valid add");

        let err = service
            .commit_sale(&cart, &FixedClock(noon()))
            .unwrap_err();

        assert!(matches!(err, DomainError::Persistence(_)));
        let state = store.snapshot();
        assert_eq!(state.line_insert_calls, 0);
        assert_eq!(state.rollbacks, 1);
        assert!(state.sales.is_empty());
    }

    #[test]
    fn failed_commit_leaves_store_unchanged() {
        let store = InMemorySaleStore::default();
        store.fail_commit(1);
        let service = SaleService::new(store.clone());
        let mut cart = Cart::new();
        cart.add_product(&medication("Ibuprofen 400mg", "3.25"), 1)
            .expect("valid add");

        let err = service
            .commit_sale(&cart, &FixedClock(noon()))
            .unwrap_err();

        assert!(matches!(err, DomainError::Persistence(_)));
        let state = store.snapshot();
        assert!(state.sales.is_empty());
        assert!(state.lines.is_empty());
    }

    #[test]
    fn failed_begin_is_reported_as_persistence_failure() {
        let store = InMemorySaleStore::default();
        store.fail_begin(1);
        let service = SaleService::new(store.clone());
        let mut cart = Cart::new();
        cart.add_product(&medication("Ibuprofen 400mg", "3.25"), 1)
            .expect("valid add");

        let err = service
            .commit_sale(&cart, &FixedClock(noon()))
            .unwrap_err();

        assert!(matches!(err, DomainError::Persistence(_)));
        assert!(store.snapshot().sales.is_empty());
    }

    #[test]
    fn cart_survives_failed_commit_and_retry_succeeds() {
        let store = InMemorySaleStore::default();
        store.fail_line_items(1);
        let service = SaleService::new(store.clone());
        let mut cart = Cart::new();
        cart.add_product(&medication("Salbutamol inhaler", "15.90"), 1)
            .expect("valid add");
        let before = cart.line_items().to_vec();

        service
            .commit_sale(&cart, &FixedClock(noon()))
            .expect_err("first attempt should fail");
        assert!(store.snapshot().sales.is_empty());
        assert_eq!(cart.line_items(), before.as_slice());

        service
            .commit_sale(&cart, &FixedClock(noon()))
            .expect("retry should succeed");

        let state = store.snapshot();
        assert_eq!(state.sales.len(), 1);
        assert_eq!(state.sales[0].id, cart.sale_id());
        assert_eq!(state.lines.len(), 1);
        assert_eq!(state.lines[0].quantity, 1);
    }

    #[test]
    fn get_sale_maps_missing_to_not_found() {
        let service = SaleService::new(InMemorySaleStore::default());
        let err = service.get_sale(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }

    #[test]
    fn list_sales_clamps_paging() {
        let store = InMemorySaleStore::default();
        let service = SaleService::new(store.clone());

        service.list_sales(0, 1000).expect("list failed");
        service.list_sales(-3, 0).expect("list failed");

        assert_eq!(store.snapshot().list_calls, vec![(1, MAX_PAGE_SIZE), (1, 1)]);
    }

    #[test]
    fn list_sales_reports_applied_paging() {
        let service = SaleService::new(InMemorySaleStore::default());

        let result = service.list_sales(i64::MAX, 500).expect("list failed");

        assert_eq!((result.page, result.limit), (i64::MAX, MAX_PAGE_SIZE));
    }
}
