use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found")]
    NotFound,
    #[error("Invalid quantity: {0} (must be at least 1)")]
    InvalidQuantity(i32),
    #[error("Cannot commit a sale from an empty cart")]
    EmptyCart,
    #[error("Insufficient stock for medication {medication_id}: requested {requested}, available {available}")]
    InsufficientStock {
        medication_id: Uuid,
        requested: i32,
        available: i32,
    },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Persistence failure: {0}")]
    Persistence(String),
}
