pub mod dashboard_repo;
pub mod medication_repo;
pub mod models;
pub mod sale_store;

#[cfg(test)]
pub(crate) mod test_db;

use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::errors::DomainError;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::NotFound => DomainError::NotFound,
            other => DomainError::Persistence(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Persistence(e.to_string())
    }
}

/// Catalog writes surface constraint violations as input errors.
pub(crate) fn catalog_write_error(e: DieselError) -> DomainError {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            DomainError::InvalidInput(format!("category does not exist ({})", info.message()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DomainError::InvalidInput(format!("already exists ({})", info.message()))
        }
        other => other.into(),
    }
}
