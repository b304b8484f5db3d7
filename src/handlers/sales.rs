use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::sale::SaleView;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleLineResponse {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub quantity: i32,
    pub unit_price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleResponse {
    pub id: Uuid,
    pub sold_at: String,
    pub total: String,
    pub lines: Vec<SaleLineResponse>,
}

impl From<SaleView> for SaleResponse {
    fn from(sale: SaleView) -> Self {
        Self {
            id: sale.id,
            sold_at: sale.sold_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            total: sale.total.to_string(),
            lines: sale
                .lines
                .into_iter()
                .map(|l| SaleLineResponse {
                    id: l.id,
                    medication_id: l.medication_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price.to_string(),
                })
                .collect(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListSalesParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListSalesResponse {
    pub items: Vec<SaleResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /sales/{id}
///
/// Returns the sale together with its line items.
#[utoipa::path(
    get,
    path = "/sales/{id}",
    params(("id" = Uuid, Path, description = "Sale UUID")),
    responses(
        (status = 200, description = "Sale found", body = SaleResponse),
        (status = 404, description = "Sale not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sales"
)]
pub async fn get_sale(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let sale_id = path.into_inner();

    let sale = web::block(move || state.sales.get_sale(sale_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(SaleResponse::from(sale)))
}

/// GET /sales
///
/// Most recent sales first, without their lines.
#[utoipa::path(
    get,
    path = "/sales",
    params(ListSalesParams),
    responses(
        (status = 200, description = "Paginated list of sales", body = ListSalesResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sales"
)]
pub async fn list_sales(
    state: web::Data<AppState>,
    query: web::Query<ListSalesParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();

    let result = web::block(move || state.sales.list_sales(params.page, params.limit))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListSalesResponse {
        items: result.items.into_iter().map(SaleResponse::from).collect(),
        total: result.total,
        page: result.page,
        limit: result.limit,
    }))
}
