use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::medication::{Category, Medication};
use crate::domain::sale::{NewSale, NewSaleLineItem, SaleLineView, SaleView};
use crate::schema::{categories, medications, sale_line_items, sales};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = medications)]
#[diesel(belongs_to(CategoryRow, foreign_key = category_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MedicationRow {
    pub id: Uuid,
    pub name: String,
    pub unit_price: BigDecimal,
    pub available_quantity: i32,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MedicationRow> for Medication {
    fn from(row: MedicationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            unit_price: row.unit_price,
            available_quantity: row.available_quantity,
            category_id: row.category_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = medications)]
pub struct NewMedicationRow {
    pub id: Uuid,
    pub name: String,
    pub unit_price: BigDecimal,
    pub available_quantity: i32,
    pub category_id: Uuid,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = medications)]
pub struct MedicationChangeset {
    pub name: Option<String>,
    pub unit_price: Option<BigDecimal>,
    pub available_quantity: Option<i32>,
    pub category_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = sales)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SaleRow {
    pub id: Uuid,
    pub sold_at: NaiveDateTime,
    pub total: BigDecimal,
}

impl SaleRow {
    pub fn into_view(self, lines: Vec<SaleLineItemRow>) -> SaleView {
        SaleView {
            id: self.id,
            sold_at: self.sold_at,
            total: self.total,
            lines: lines
                .into_iter()
                .map(|l| SaleLineView {
                    id: l.id,
                    medication_id: l.medication_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sales)]
pub struct NewSaleRow {
    pub id: Uuid,
    pub sold_at: NaiveDateTime,
    pub total: BigDecimal,
}

impl From<&NewSale> for NewSaleRow {
    fn from(sale: &NewSale) -> Self {
        Self {
            id: sale.id,
            sold_at: sale.sold_at,
            total: sale.total.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = sale_line_items)]
#[diesel(belongs_to(SaleRow, foreign_key = sale_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SaleLineItemRow {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub medication_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sale_line_items)]
pub struct NewSaleLineItemRow {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub medication_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl From<&NewSaleLineItem> for NewSaleLineItemRow {
    fn from(item: &NewSaleLineItem) -> Self {
        Self {
            id: item.id,
            sale_id: item.sale_id,
            medication_id: item.medication_id,
            quantity: item.quantity,
            unit_price: item.unit_price.clone(),
        }
    }
}
