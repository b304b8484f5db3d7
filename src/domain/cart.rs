use bigdecimal::{BigDecimal, Zero};
use uuid::Uuid;

use super::errors::DomainError;
use super::medication::Medication;

/// One pending line of a sale. The unit price is captured when the line is
/// added, so later catalog price edits do not affect an open cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineItem {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub medication_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl CartLineItem {
    pub fn subtotal(&self) -> BigDecimal {
        &self.unit_price * &BigDecimal::from(self.quantity)
    }
}

/// In-memory aggregate for one in-progress sale.
///
/// The sale identifier is fixed at creation and becomes the persisted sale's
/// identifier on commit. Line items are keyed by their own identifier; adding
/// the same medication twice yields two independent lines.
#[derive(Debug, Clone)]
pub struct Cart {
    sale_id: Uuid,
    items: Vec<CartLineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self {
            sale_id: Uuid::new_v4(),
            items: Vec::new(),
        }
    }

    pub fn sale_id(&self) -> Uuid {
        self.sale_id
    }

    /// Appends a line for `medication`. Rejects `quantity < 1` without
    /// touching the cart.
    pub fn add_product(
        &mut self,
        medication: &Medication,
        quantity: i32,
    ) -> Result<Uuid, DomainError> {
        if quantity < 1 {
            return Err(DomainError::InvalidQuantity(quantity));
        }
        let id = Uuid::new_v4();
        self.items.push(CartLineItem {
            id,
            medication_id: medication.id,
            medication_name: medication.name.clone(),
            quantity,
            unit_price: medication.unit_price.clone(),
        });
        Ok(id)
    }

    /// Removes the line with `line_id`. Unknown ids are ignored.
    pub fn remove_product(&mut self, line_id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != line_id);
        self.items.len() != before
    }

    /// Number of lines, not the sum of their quantities.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn line_items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn total(&self) -> BigDecimal {
        self.items
            .iter()
            .fold(BigDecimal::zero(), |acc, item| acc + item.subtotal())
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}
