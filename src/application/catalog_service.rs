use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::medication::{
    validate_name, Category, Medication, MedicationChanges, MedicationQuery, NewMedication,
};
use crate::domain::ports::MedicationRepository;

pub struct CatalogService<M> {
    repo: M,
}

impl<M: MedicationRepository> CatalogService<M> {
    pub fn new(repo: M) -> Self {
        Self { repo }
    }

    pub fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.repo.list_categories()
    }

    pub fn create_category(&self, name: &str) -> Result<Category, DomainError> {
        let name = validate_name(name)?;
        let category = self.repo.create_category(&name)?;
        log::info!("Category '{}' created", category.name);
        Ok(category)
    }

    pub fn list_medications(&self) -> Result<Vec<Medication>, DomainError> {
        self.repo.list()
    }

    pub fn search_medications(&self, query: MedicationQuery) -> Result<Vec<Medication>, DomainError> {
        let query = query.normalized().inspect_err(|_| {
            log::warn!("Rejected medication search without parameters");
        })?;
        log::debug!(
            "Searching medications: name={:?} category={:?}",
            query.name,
            query.category_id
        );
        self.repo.search(&query)
    }

    pub fn get_medication(&self, id: Uuid) -> Result<Medication, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound)
    }

    pub fn create_medication(&self, medication: NewMedication) -> Result<Medication, DomainError> {
        let medication = medication.validated()?;
        let created = self.repo.create(&medication)?;
        log::info!("Medication {} '{}' created", created.id, created.name);
        Ok(created)
    }

    /// Applies an edit or a restock. Fails with `InvalidInput` when there is
    /// nothing to change.
    pub fn update_medication(
        &self,
        id: Uuid,
        changes: MedicationChanges,
    ) -> Result<Medication, DomainError> {
        let changes = changes.validated()?;
        let updated = self.repo.update(id, &changes)?;
        log::info!(
            "Medication {} updated (stock {}, price {})",
            updated.id,
            updated.available_quantity,
            updated.unit_price
        );
        Ok(updated)
    }

    /// Resolves a medication for the cart and checks the requested quantity
    /// against current stock. The check is advisory: it is not repeated when
    /// the cart is added to, only when the sale is written.
    pub fn select_for_sale(&self, id: Uuid, quantity: i32) -> Result<Medication, DomainError> {
        if quantity < 1 {
            return Err(DomainError::InvalidQuantity(quantity));
        }
        let medication = self.get_medication(id)?;
        if quantity > medication.available_quantity {
            log::warn!(
                "Requested {} units of {} but only {} available",
                quantity,
                medication.id,
                medication.available_quantity
            );
            return Err(DomainError::InsufficientStock {
                medication_id: medication.id,
                requested: quantity,
                available: medication.available_quantity,
            });
        }
        Ok(medication)
    }
}
