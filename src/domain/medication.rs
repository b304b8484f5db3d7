use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub unit_price: BigDecimal,
    pub available_quantity: i32,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMedication {
    pub name: String,
    pub unit_price: BigDecimal,
    pub available_quantity: i32,
    pub category_id: Uuid,
}

impl NewMedication {
    /// Trims the name and checks price and stock bounds.
    pub fn validated(self) -> Result<Self, DomainError> {
        let name = validate_name(&self.name)?;
        validate_price(&self.unit_price)?;
        validate_stock(self.available_quantity)?;
        Ok(Self { name, ..self })
    }
}

/// Partial edit of a medication. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct MedicationChanges {
    pub name: Option<String>,
    pub unit_price: Option<BigDecimal>,
    pub available_quantity: Option<i32>,
    pub category_id: Option<Uuid>,
}

impl MedicationChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.unit_price.is_none()
            && self.available_quantity.is_none()
            && self.category_id.is_none()
    }

    pub fn validated(self) -> Result<Self, DomainError> {
        if self.is_empty() {
            return Err(DomainError::InvalidInput("no changes to save".to_string()));
        }
        let name = self.name.as_deref().map(validate_name).transpose()?;
        if let Some(price) = &self.unit_price {
            validate_price(price)?;
        }
        if let Some(quantity) = self.available_quantity {
            validate_stock(quantity)?;
        }
        Ok(Self { name, ..self })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MedicationQuery {
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
}

impl MedicationQuery {
    /// Drops blank name filters and rejects a query with no filter at all.
    pub fn normalized(self) -> Result<Self, DomainError> {
        let name = self
            .name
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty());
        if name.is_none() && self.category_id.is_none() {
            return Err(DomainError::InvalidInput(
                "a name or a category is required to search medications".to_string(),
            ));
        }
        Ok(Self {
            name,
            category_id: self.category_id,
        })
    }
}

pub(crate) fn validate_name(name: &str) -> Result<String, DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput("name must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Prices are stored as `NUMERIC(12,2)`.
const MAX_PRICE_SCALE: i64 = 2;
const PRICE_LIMIT: i64 = 10_000_000_000;

fn validate_price(price: &BigDecimal) -> Result<(), DomainError> {
    if price < &BigDecimal::zero() {
        return Err(DomainError::InvalidInput(format!(
            "unit price must not be negative, got {price}"
        )));
    }
    let (_, scale) = price.normalized().as_bigint_and_exponent();
    if scale > MAX_PRICE_SCALE {
        return Err(DomainError::InvalidInput(format!(
            "unit price must have at most {MAX_PRICE_SCALE} decimal places, got {price}"
        )));
    }
    if price >= &BigDecimal::from(PRICE_LIMIT) {
        return Err(DomainError::InvalidInput(format!(
            "unit price must be below {PRICE_LIMIT}, got {price}"
        )));
    }
    Ok(())
}

fn validate_stock(quantity: i32) -> Result<(), DomainError> {
    if quantity < 0 {
        return Err(DomainError::InvalidInput(format!(
            "available quantity must not be negative, got {quantity}"
        )));
    }
    Ok(())
}
