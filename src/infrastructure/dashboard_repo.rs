use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDateTime;
use diesel::dsl::sum;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::dashboard::{DashboardSettings, DashboardSummary, TopSeller};
use crate::domain::errors::DomainError;
use crate::domain::medication::Medication;
use crate::domain::ports::DashboardRepository;
use crate::schema::{medications, sale_line_items, sales};

use super::models::{MedicationRow, SaleRow};

pub struct DieselDashboardRepository {
    pool: DbPool,
}

impl DieselDashboardRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_medications(rows: Vec<MedicationRow>) -> Vec<Medication> {
    rows.into_iter().map(Medication::from).collect()
}

impl DashboardRepository for DieselDashboardRepository {
    fn summary(
        &self,
        settings: &DashboardSettings,
        revenue_since: NaiveDateTime,
    ) -> Result<DashboardSummary, DomainError> {
        let mut conn = self.pool.get()?;
        let top_n = settings.top_n;

        // REPEATABLE READ gives every query below the same snapshot.
        conn.build_transaction()
            .read_only()
            .repeatable_read()
            .run::<_, DomainError, _>(|conn| {
                let medications_in_stock: i64 = medications::table
                    .filter(medications::available_quantity.gt(0))
                    .count()
                    .get_result(conn)?;

                let sales_count: i64 = sales::table.count().get_result(conn)?;

                let recent_sales = sales::table
                    .select(SaleRow::as_select())
                    .order(sales::sold_at.desc())
                    .limit(top_n)
                    .load(conn)?
                    .into_iter()
                    .map(|s| s.into_view(vec![]))
                    .collect();

                let most_expensive = medications::table
                    .filter(medications::available_quantity.gt(0))
                    .select(MedicationRow::as_select())
                    .order(medications::unit_price.desc())
                    .limit(top_n)
                    .load(conn)?;

                let low_stock = medications::table
                    .filter(medications::available_quantity.lt(settings.low_stock_threshold))
                    .select(MedicationRow::as_select())
                    .order((medications::available_quantity.asc(), medications::name.asc()))
                    .load(conn)?;

                let largest_inventory = medications::table
                    .filter(medications::available_quantity.gt(0))
                    .select(MedicationRow::as_select())
                    .order(medications::available_quantity.desc())
                    .limit(top_n)
                    .load(conn)?;

                let total_revenue: Option<BigDecimal> =
                    sales::table.select(sum(sales::total)).first(conn)?;

                let recent_revenue: Option<BigDecimal> = sales::table
                    .filter(sales::sold_at.ge(revenue_since))
                    .select(sum(sales::total))
                    .first(conn)?;

                let top_sellers: Vec<(String, Option<i64>)> = sale_line_items::table
                    .inner_join(medications::table)
                    .group_by((medications::id, medications::name))
                    .select((medications::name, sum(sale_line_items::quantity)))
                    .order(sum(sale_line_items::quantity).desc())
                    .limit(top_n)
                    .load(conn)?;

                Ok(DashboardSummary {
                    medications_in_stock,
                    sales_count,
                    recent_sales,
                    most_expensive: to_medications(most_expensive),
                    low_stock: to_medications(low_stock),
                    largest_inventory: to_medications(largest_inventory),
                    total_revenue: total_revenue.unwrap_or_else(BigDecimal::zero),
                    recent_revenue: recent_revenue.unwrap_or_else(BigDecimal::zero),
                    revenue_since,
                    top_sellers: top_sellers
                        .into_iter()
                        .map(|(medication_name, units)| TopSeller {
                            medication_name,
                            units_sold: units.unwrap_or(0),
                        })
                        .collect(),
                })
            })
    }
}
