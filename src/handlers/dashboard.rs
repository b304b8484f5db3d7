use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::dashboard::{DashboardSummary, TopSeller};
use crate::errors::AppError;
use crate::state::AppState;

use super::medications::{to_responses, MedicationResponse};
use super::sales::SaleResponse;

#[derive(Debug, Serialize, ToSchema)]
pub struct TopSellerResponse {
    pub medication_name: String,
    pub units_sold: i64,
}

impl From<TopSeller> for TopSellerResponse {
    fn from(t: TopSeller) -> Self {
        Self {
            medication_name: t.medication_name,
            units_sold: t.units_sold,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub medications_in_stock: i64,
    pub sales_count: i64,
    pub total_revenue: String,
    pub recent_revenue: String,
    /// Start of the window `recent_revenue` covers.
    pub revenue_since: String,
    pub recent_sales: Vec<SaleResponse>,
    pub most_expensive: Vec<MedicationResponse>,
    pub low_stock: Vec<MedicationResponse>,
    pub largest_inventory: Vec<MedicationResponse>,
    pub top_sellers: Vec<TopSellerResponse>,
}

impl From<DashboardSummary> for DashboardResponse {
    fn from(s: DashboardSummary) -> Self {
        Self {
            medications_in_stock: s.medications_in_stock,
            sales_count: s.sales_count,
            total_revenue: s.total_revenue.to_string(),
            recent_revenue: s.recent_revenue.to_string(),
            revenue_since: s.revenue_since.format("%Y-%m-%dT%H:%M:%S").to_string(),
            recent_sales: s.recent_sales.into_iter().map(SaleResponse::from).collect(),
            most_expensive: to_responses(s.most_expensive),
            low_stock: to_responses(s.low_stock),
            largest_inventory: to_responses(s.largest_inventory),
            top_sellers: s.top_sellers.into_iter().map(TopSellerResponse::from).collect(),
        }
    }
}

/// GET /dashboard
///
/// Inventory and sales figures for the front page, read from one snapshot.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Dashboard figures", body = DashboardResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "dashboard"
)]
pub async fn get_dashboard(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let summary = web::block(move || state.dashboard.summary(state.clock.as_ref()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(DashboardResponse::from(summary)))
}
