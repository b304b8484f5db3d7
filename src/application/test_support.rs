//! In-memory doubles for the storage ports, used by the service tests.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::medication::{
    Category, Medication, MedicationChanges, MedicationQuery, NewMedication,
};
use crate::domain::ports::{MedicationRepository, SaleStore, SaleTransaction};
use crate::domain::sale::{ListResult, NewSale, NewSaleLineItem, SaleLineView, SaleView};

#[derive(Debug, Default, Clone)]
pub struct StoreState {
    pub sales: Vec<NewSale>,
    pub lines: Vec<NewSaleLineItem>,
    pub begin_calls: usize,
    pub line_insert_calls: usize,
    pub commits: usize,
    pub rollbacks: usize,
    pub list_calls: Vec<(i64, i64)>,
}

#[derive(Debug, Default)]
struct Failures {
    begin: usize,
    sale_insert: usize,
    line_items: usize,
    commit: usize,
}

fn take(counter: &mut usize) -> bool {
    if *counter > 0 {
        *counter -= 1;
        true
    } else {
        false
    }
}

fn simulated(step: &str) -> DomainError {
    DomainError::Persistence(format!("simulated {step} failure"))
}

/// Writes go straight into the shared state and are undone on rollback, so
/// a test can observe whether the committer actually rolled back.
#[derive(Debug, Default, Clone)]
pub struct InMemorySaleStore {
    state: Arc<Mutex<StoreState>>,
    failures: Arc<Mutex<Failures>>,
}

impl InMemorySaleStore {
    pub fn fail_begin(&self, times: usize) {
        self.failures().begin = times;
    }

    pub fn fail_sale_insert(&self, times: usize) {
        self.failures().sale_insert = times;
    }

    pub fn fail_line_items(&self, times: usize) {
        self.failures().line_items = times;
    }

    pub fn fail_commit(&self, times: usize) {
        self.failures().commit = times;
    }

    pub fn snapshot(&self) -> StoreState {
        self.state().clone()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("store state poisoned")
    }

    fn failures(&self) -> MutexGuard<'_, Failures> {
        self.failures.lock().expect("failure config poisoned")
    }
}

pub struct InMemoryTransaction {
    store: InMemorySaleStore,
    sale_ids: Vec<Uuid>,
    line_ids: Vec<Uuid>,
}

impl InMemoryTransaction {
    fn undo(&self) {
        let mut state = self.store.state();
        state.sales.retain(|s| !self.sale_ids.contains(&s.id));
        state.lines.retain(|l| !self.line_ids.contains(&l.id));
    }
}

impl SaleTransaction for InMemoryTransaction {
    fn insert_sale(&mut self, sale: &NewSale) -> Result<(), DomainError> {
        if take(&mut self.store.failures().sale_insert) {
            return Err(simulated("sale insert"));
        }
        self.store.state().sales.push(sale.clone());
        self.sale_ids.push(sale.id);
        Ok(())
    }

    fn insert_sale_line_items(&mut self, items: &[NewSaleLineItem]) -> Result<(), DomainError> {
        self.store.state().line_insert_calls += 1;
        if take(&mut self.store.failures().line_items) {
            return Err(simulated("line item insert"));
        }
        self.store.state().lines.extend(items.iter().cloned());
        self.line_ids.extend(items.iter().map(|l| l.id));
        Ok(())
    }

    fn commit(self) -> Result<(), DomainError> {
        if take(&mut self.store.failures().commit) {
            self.undo();
            return Err(simulated("commit"));
        }
        self.store.state().commits += 1;
        Ok(())
    }

    fn rollback(self) {
        self.undo();
        self.store.state().rollbacks += 1;
    }
}

impl SaleStore for InMemorySaleStore {
    type Transaction = InMemoryTransaction;

    fn begin_transaction(&self) -> Result<Self::Transaction, DomainError> {
        self.state().begin_calls += 1;
        if take(&mut self.failures().begin) {
            return Err(simulated("begin"));
        }
        Ok(InMemoryTransaction {
            store: self.clone(),
            sale_ids: Vec::new(),
            line_ids: Vec::new(),
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<SaleView>, DomainError> {
        let state = self.state();
        Ok(state.sales.iter().find(|s| s.id == id).map(|s| SaleView {
            id: s.id,
            sold_at: s.sold_at,
            total: s.total.clone(),
            lines: state
                .lines
                .iter()
                .filter(|l| l.sale_id == id)
                .map(|l| SaleLineView {
                    id: l.id,
                    medication_id: l.medication_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price.clone(),
                })
                .collect(),
        }))
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut state = self.state();
        state.list_calls.push((page, limit));
        Ok(ListResult {
            items: vec![],
            total: state.sales.len() as i64,
            page,
            limit,
        })
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryMedicationRepository {
    categories: Arc<Mutex<Vec<Category>>>,
    medications: Arc<Mutex<Vec<Medication>>>,
}

impl InMemoryMedicationRepository {
    fn categories(&self) -> MutexGuard<'_, Vec<Category>> {
        self.categories.lock().expect("categories poisoned")
    }

    fn medications(&self) -> MutexGuard<'_, Vec<Medication>> {
        self.medications.lock().expect("medications poisoned")
    }
}

impl MedicationRepository for InMemoryMedicationRepository {
    fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut categories = self.categories().clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    fn create_category(&self, name: &str) -> Result<Category, DomainError> {
        let mut categories = self.categories();
        if categories.iter().any(|c| c.name == name) {
            return Err(DomainError::InvalidInput(format!("category '{name}' already exists")));
        }
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        categories.push(category.clone());
        Ok(category)
    }

    fn list(&self) -> Result<Vec<Medication>, DomainError> {
        let mut medications = self.medications().clone();
        medications.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(medications)
    }

    fn search(&self, query: &MedicationQuery) -> Result<Vec<Medication>, DomainError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|m| {
                query
                    .name
                    .as_deref()
                    .map_or(true, |n| m.name.to_lowercase().contains(n))
            })
            .filter(|m| query.category_id.map_or(true, |c| m.category_id == c))
            .collect())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Medication>, DomainError> {
        Ok(self.medications().iter().find(|m| m.id == id).cloned())
    }

    fn create(&self, medication: &NewMedication) -> Result<Medication, DomainError> {
        if !self.categories().iter().any(|c| c.id == medication.category_id) {
            return Err(DomainError::InvalidInput("category does not exist".to_string()));
        }
        let now = Utc::now();
        let created = Medication {
            id: Uuid::new_v4(),
            name: medication.name.clone(),
            unit_price: medication.unit_price.clone(),
            available_quantity: medication.available_quantity,
            category_id: medication.category_id,
            created_at: now,
            updated_at: now,
        };
        self.medications().push(created.clone());
        Ok(created)
    }

    fn update(&self, id: Uuid, changes: &MedicationChanges) -> Result<Medication, DomainError> {
        let mut medications = self.medications();
        let med = medications
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(DomainError::NotFound)?;
        if let Some(name) = &changes.name {
            med.name = name.clone();
        }
        if let Some(price) = &changes.unit_price {
            med.unit_price = price.clone();
        }
        if let Some(quantity) = changes.available_quantity {
            med.available_quantity = quantity;
        }
        if let Some(category_id) = changes.category_id {
            med.category_id = category_id;
        }
        med.updated_at = Utc::now();
        Ok(med.clone())
    }
}
