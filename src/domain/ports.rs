use chrono::NaiveDateTime;
use uuid::Uuid;

use super::dashboard::{DashboardSettings, DashboardSummary};
use super::errors::DomainError;
use super::medication::{Category, Medication, MedicationChanges, MedicationQuery, NewMedication};
use super::sale::{ListResult, NewSale, NewSaleLineItem, SaleView};

/// An open unit of work against the sale tables.
///
/// Writes become visible to other readers only after `commit`. Dropping an
/// uncommitted transaction rolls it back.
pub trait SaleTransaction {
    fn insert_sale(&mut self, sale: &NewSale) -> Result<(), DomainError>;
    fn insert_sale_line_items(&mut self, items: &[NewSaleLineItem]) -> Result<(), DomainError>;
    fn commit(self) -> Result<(), DomainError>;
    fn rollback(self);
}

pub trait SaleStore: Send + Sync + 'static {
    type Transaction: SaleTransaction;

    fn begin_transaction(&self) -> Result<Self::Transaction, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<SaleView>, DomainError>;
    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError>;
}

pub trait MedicationRepository: Send + Sync + 'static {
    fn list_categories(&self) -> Result<Vec<Category>, DomainError>;
    fn create_category(&self, name: &str) -> Result<Category, DomainError>;
    fn list(&self) -> Result<Vec<Medication>, DomainError>;
    fn search(&self, query: &MedicationQuery) -> Result<Vec<Medication>, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Medication>, DomainError>;
    fn create(&self, medication: &NewMedication) -> Result<Medication, DomainError>;
    fn update(&self, id: Uuid, changes: &MedicationChanges) -> Result<Medication, DomainError>;
}

pub trait DashboardRepository: Send + Sync + 'static {
    fn summary(
        &self,
        settings: &DashboardSettings,
        revenue_since: NaiveDateTime,
    ) -> Result<DashboardSummary, DomainError>;
}
