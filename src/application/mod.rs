pub mod cart_registry;
pub mod catalog_service;
pub mod dashboard_service;
pub mod sale_service;

#[cfg(test)]
pub(crate) mod test_support;
