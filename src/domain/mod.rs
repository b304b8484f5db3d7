pub mod cart;
pub mod clock;
pub mod dashboard;
pub mod errors;
pub mod medication;
pub mod ports;
pub mod sale;
