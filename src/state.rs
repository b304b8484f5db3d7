use std::time::Duration;

use crate::application::cart_registry::CartRegistry;
use crate::application::catalog_service::CatalogService;
use crate::application::dashboard_service::DashboardService;
use crate::application::sale_service::SaleService;
use crate::db::DbPool;
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::dashboard::DashboardSettings;
use crate::infrastructure::dashboard_repo::DieselDashboardRepository;
use crate::infrastructure::medication_repo::DieselMedicationRepository;
use crate::infrastructure::sale_store::DieselSaleStore;

/// Everything a request handler needs, shared across workers.
pub struct AppState {
    pub catalog: CatalogService<DieselMedicationRepository>,
    pub sales: SaleService<DieselSaleStore>,
    pub dashboard: DashboardService<DieselDashboardRepository>,
    pub carts: CartRegistry,
    pub clock: Box<dyn Clock>,
}

impl AppState {
    pub fn new(pool: DbPool, dashboard: DashboardSettings, cart_idle_timeout: Duration) -> Self {
        Self {
            catalog: CatalogService::new(DieselMedicationRepository::new(pool.clone())),
            sales: SaleService::new(DieselSaleStore::new(pool.clone())),
            dashboard: DashboardService::new(DieselDashboardRepository::new(pool), dashboard),
            carts: CartRegistry::with_idle_timeout(cart_idle_timeout),
            clock: Box::new(SystemClock),
        }
    }
}
