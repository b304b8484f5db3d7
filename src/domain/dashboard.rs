use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;

use super::medication::Medication;
use super::sale::SaleView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    /// Medications with fewer units than this are reported as low stock.
    pub low_stock_threshold: i32,
    /// Length of every "top"/"recent" list.
    pub top_n: i64,
    /// Days covered by the recent revenue figure, counted from local midnight.
    pub revenue_window_days: i64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            low_stock_threshold: 5,
            top_n: 10,
            revenue_window_days: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopSeller {
    pub medication_name: String,
    pub units_sold: i64,
}

#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub medications_in_stock: i64,
    pub sales_count: i64,
    pub recent_sales: Vec<SaleView>,
    pub most_expensive: Vec<Medication>,
    pub low_stock: Vec<Medication>,
    pub largest_inventory: Vec<Medication>,
    pub total_revenue: BigDecimal,
    pub recent_revenue: BigDecimal,
    pub revenue_since: NaiveDateTime,
    pub top_sellers: Vec<TopSeller>,
}
