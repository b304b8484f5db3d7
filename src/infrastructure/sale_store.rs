use chrono::Utc;
use diesel::connection::{AnsiTransactionManager, TransactionManager};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::{DbConnection, DbPool};
use crate::domain::errors::DomainError;
use crate::domain::ports::{SaleStore, SaleTransaction};
use crate::domain::sale::{ListResult, NewSale, NewSaleLineItem, SaleView};
use crate::schema::{medications, sale_line_items, sales};

use super::models::{NewSaleLineItemRow, NewSaleRow, SaleLineItemRow, SaleRow};

pub struct DieselSaleStore {
    pool: DbPool,
}

impl DieselSaleStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// A Postgres transaction pinned to one pooled connection. Rolled back on
/// drop unless committed.
pub struct PgSaleTransaction {
    conn: DbConnection,
    open: bool,
}

impl PgSaleTransaction {
    fn rollback_in_place(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Err(e) = AnsiTransactionManager::rollback_transaction(&mut *self.conn) {
            log::error!("Rollback failed: {}", e);
        }
    }
}

/// Takes `quantity` units off the medication's stock, failing when fewer are
/// available. Runs inside the sale transaction so an oversell aborts the sale.
fn decrement_stock(
    conn: &mut PgConnection,
    medication_id: Uuid,
    quantity: i32,
) -> Result<(), DomainError> {
    let updated = diesel::update(
        medications::table
            .filter(medications::id.eq(medication_id))
            .filter(medications::available_quantity.ge(quantity)),
    )
    .set((
        medications::available_quantity.eq(medications::available_quantity - quantity),
        medications::updated_at.eq(Utc::now()),
    ))
    .execute(conn)?;

    if updated == 0 {
        let available = medications::table
            .find(medication_id)
            .select(medications::available_quantity)
            .first::<i32>(conn)
            .optional()?;
        return Err(match available {
            Some(available) => DomainError::InsufficientStock {
                medication_id,
                requested: quantity,
                available,
            },
            None => DomainError::Persistence(format!("medication {medication_id} does not exist")),
        });
    }
    Ok(())
}

impl SaleTransaction for PgSaleTransaction {
    fn insert_sale(&mut self, sale: &NewSale) -> Result<(), DomainError> {
        diesel::insert_into(sales::table)
            .values(&NewSaleRow::from(sale))
            .execute(&mut *self.conn)?;
        Ok(())
    }

    fn insert_sale_line_items(&mut self, items: &[NewSaleLineItem]) -> Result<(), DomainError> {
        let rows: Vec<NewSaleLineItemRow> = items.iter().map(NewSaleLineItemRow::from).collect();
        diesel::insert_into(sale_line_items::table)
            .values(&rows)
            .execute(&mut *self.conn)?;

        for item in items {
            decrement_stock(&mut *self.conn, item.medication_id, item.quantity)?;
        }
        Ok(())
    }

    fn commit(mut self) -> Result<(), DomainError> {
        // A failed COMMIT still ends the transaction on the server.
        self.open = false;
        AnsiTransactionManager::commit_transaction(&mut *self.conn)?;
        Ok(())
    }

    fn rollback(mut self) {
        self.rollback_in_place();
    }
}

impl Drop for PgSaleTransaction {
    fn drop(&mut self) {
        if self.open {
            log::warn!("Sale transaction dropped without commit, rolling back");
            self.rollback_in_place();
        }
    }
}

impl SaleStore for DieselSaleStore {
    type Transaction = PgSaleTransaction;

    fn begin_transaction(&self) -> Result<PgSaleTransaction, DomainError> {
        let mut conn = self.pool.get()?;
        AnsiTransactionManager::begin_transaction(&mut *conn)?;
        Ok(PgSaleTransaction { conn, open: true })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<SaleView>, DomainError> {
        let mut conn = self.pool.get()?;

        let sale = sales::table
            .filter(sales::id.eq(id))
            .select(SaleRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(sale) = sale else {
            return Ok(None);
        };

        let lines = SaleLineItemRow::belonging_to(&sale)
            .select(SaleLineItemRow::as_select())
            .load(&mut conn)?;

        Ok(Some(sale.into_view(lines)))
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = sales::table.count().get_result(conn)?;

            // A page whose offset does not fit an i64 is past the end.
            let Some(offset) = (page - 1).checked_mul(limit) else {
                return Ok(ListResult {
                    items: vec![],
                    total,
                    page,
                    limit,
                });
            };

            let rows = sales::table
                .select(SaleRow::as_select())
                .order(sales::sold_at.desc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: rows.into_iter().map(|s| s.into_view(vec![])).collect(),
                total,
                page,
                limit,
            })
        })
    }
}
