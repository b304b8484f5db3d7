pub mod carts;
pub mod dashboard;
pub mod medications;
pub mod sales;

use actix_web::HttpResponse;
use utoipa::OpenApi;

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up")),
    tag = "health"
)]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Pharmacy point of sale API"),
    paths(
        health,
        medications::list_categories,
        medications::create_category,
        medications::list_medications,
        medications::search_medications,
        medications::get_medication,
        medications::create_medication,
        medications::update_medication,
        carts::add_product,
        carts::get_cart,
        carts::remove_product,
        carts::cancel_cart,
        carts::checkout,
        sales::list_sales,
        sales::get_sale,
        dashboard::get_dashboard,
    ),
    components(schemas(
        medications::CreateCategoryRequest,
        medications::CategoryResponse,
        medications::CreateMedicationRequest,
        medications::UpdateMedicationRequest,
        medications::MedicationResponse,
        carts::AddProductRequest,
        carts::CartResponse,
        carts::CartLineResponse,
        carts::SaleReceiptResponse,
        sales::SaleResponse,
        sales::SaleLineResponse,
        sales::ListSalesResponse,
        dashboard::DashboardResponse,
        dashboard::TopSellerResponse,
    )),
    tags(
        (name = "catalog", description = "Categories, medications and restocking"),
        (name = "carts", description = "Building and checking out a sale"),
        (name = "sales", description = "Sale history"),
        (name = "dashboard", description = "Inventory and revenue figures"),
    )
)]
pub struct ApiDoc;
