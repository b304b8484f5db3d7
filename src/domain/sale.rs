use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use uuid::Uuid;

use super::cart::Cart;

#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub id: Uuid,
    pub sold_at: NaiveDateTime,
    pub total: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSaleLineItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub medication_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl NewSaleLineItem {
    /// One persisted line per cart line, all referencing the cart's sale id.
    pub fn from_cart(cart: &Cart) -> Vec<Self> {
        cart.line_items()
            .iter()
            .map(|line| Self {
                id: line.id,
                sale_id: cart.sale_id(),
                medication_id: line.medication_id,
                quantity: line.quantity,
                unit_price: line.unit_price.clone(),
            })
            .collect()
    }
}

/// Result of a successful commit, returned to the caller in place of the
/// discarded cart.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleReceipt {
    pub sale_id: Uuid,
    pub sold_at: NaiveDateTime,
    pub total: BigDecimal,
    pub line_count: usize,
}

#[derive(Debug, Clone)]
pub struct SaleLineView {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct SaleView {
    pub id: Uuid,
    pub sold_at: NaiveDateTime,
    pub total: BigDecimal,
    pub lines: Vec<SaleLineView>,
}

/// One page of sales. `page` and `limit` are the values actually applied.
#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<SaleView>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}
