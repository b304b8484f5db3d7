use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::medication::{
    Category, Medication, MedicationChanges, MedicationQuery, NewMedication,
};
use crate::domain::ports::MedicationRepository;
use crate::schema::{categories, medications};

use super::catalog_write_error;
use super::models::{CategoryRow, MedicationChangeset, MedicationRow, NewMedicationRow};

#[derive(Clone)]
pub struct DieselMedicationRepository {
    pool: DbPool,
}

impl DieselMedicationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE wildcards so `fragment` matches literally. Postgres uses `\`
/// as the default escape character.
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl MedicationRepository for DieselMedicationRepository {
    fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = categories::table
            .select(CategoryRow::as_select())
            .order(categories::name.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    fn create_category(&self, name: &str) -> Result<Category, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(categories::table)
            .values(&CategoryRow {
                id: Uuid::new_v4(),
                name: name.to_string(),
            })
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)
            .map_err(catalog_write_error)?;
        Ok(row.into())
    }

    fn list(&self) -> Result<Vec<Medication>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = medications::table
            .select(MedicationRow::as_select())
            .order(medications::name.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Medication::from).collect())
    }

    fn search(&self, query: &MedicationQuery) -> Result<Vec<Medication>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut sql = medications::table
            .select(MedicationRow::as_select())
            .into_boxed();

        if let Some(name) = &query.name {
            sql = sql.filter(medications::name.ilike(format!("%{}%", escape_like(name))));
        }
        if let Some(category_id) = query.category_id {
            sql = sql.filter(medications::category_id.eq(category_id));
        }

        let rows = sql.order(medications::name.asc()).load(&mut conn)?;
        Ok(rows.into_iter().map(Medication::from).collect())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Medication>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = medications::table
            .find(id)
            .select(MedicationRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Medication::from))
    }

    fn create(&self, medication: &NewMedication) -> Result<Medication, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(medications::table)
            .values(&NewMedicationRow {
                id: Uuid::new_v4(),
                name: medication.name.clone(),
                unit_price: medication.unit_price.clone(),
                available_quantity: medication.available_quantity,
                category_id: medication.category_id,
            })
            .returning(MedicationRow::as_returning())
            .get_result(&mut conn)
            .map_err(catalog_write_error)?;
        Ok(row.into())
    }

    fn update(&self, id: Uuid, changes: &MedicationChanges) -> Result<Medication, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = diesel::update(medications::table.find(id))
                .set(&MedicationChangeset {
                    name: changes.name.clone(),
                    unit_price: changes.unit_price.clone(),
                    available_quantity: changes.available_quantity,
                    category_id: changes.category_id,
                    updated_at: Utc::now(),
                })
                .returning(MedicationRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(catalog_write_error)?;
            row.map(Medication::from).ok_or(DomainError::NotFound)
        })
    }
}
