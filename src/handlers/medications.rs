use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::medication::{
    Category, Medication, MedicationChanges, MedicationQuery, NewMedication,
};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMedicationRequest {
    pub name: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub unit_price: String,
    pub available_quantity: i32,
    pub category_id: Uuid,
}

/// Every field is optional; a restock only sends `available_quantity`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateMedicationRequest {
    pub name: Option<String>,
    pub unit_price: Option<String>,
    pub available_quantity: Option<i32>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MedicationResponse {
    pub id: Uuid,
    pub name: String,
    pub unit_price: String,
    pub available_quantity: i32,
    pub category_id: Uuid,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Medication> for MedicationResponse {
    fn from(m: Medication) -> Self {
        Self {
            id: m.id,
            name: m.name,
            unit_price: m.unit_price.to_string(),
            available_quantity: m.available_quantity,
            category_id: m.category_id,
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive fragment of the medication name.
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
}

fn parse_price(raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid unit_price '{}': {}", raw, e)))
}

pub(super) fn to_responses(medications: Vec<Medication>) -> Vec<MedicationResponse> {
    medications.into_iter().map(MedicationResponse::from).collect()
}

// ── Categories ───────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "All categories by name", body = [CategoryResponse]),
    ),
    tag = "catalog"
)]
pub async fn list_categories(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let categories = web::block(move || state.catalog.list_categories())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<CategoryResponse> = categories.into_iter().map(CategoryResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    post,
    path = "/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Blank or duplicate name"),
    ),
    tag = "catalog"
)]
pub async fn create_category(
    state: web::Data<AppState>,
    body: web::Json<CreateCategoryRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let category = web::block(move || state.catalog.create_category(&body.name))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CategoryResponse::from(category)))
}

// ── Medications ──────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/medications",
    responses(
        (status = 200, description = "Full inventory by name", body = [MedicationResponse]),
    ),
    tag = "catalog"
)]
pub async fn list_medications(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let medications = web::block(move || state.catalog.list_medications())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(to_responses(medications)))
}

/// GET /medications/search
///
/// At least one of `name` or `category_id` is required.
#[utoipa::path(
    get,
    path = "/medications/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching medications", body = [MedicationResponse]),
        (status = 400, description = "No search criteria given"),
    ),
    tag = "catalog"
)]
pub async fn search_medications(
    state: web::Data<AppState>,
    query: web::Query<SearchParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let query = MedicationQuery {
        name: params.name,
        category_id: params.category_id,
    };

    let medications = web::block(move || state.catalog.search_medications(query))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(to_responses(medications)))
}

#[utoipa::path(
    get,
    path = "/medications/{id}",
    params(("id" = Uuid, Path, description = "Medication UUID")),
    responses(
        (status = 200, description = "Medication found", body = MedicationResponse),
        (status = 404, description = "Medication not found"),
    ),
    tag = "catalog"
)]
pub async fn get_medication(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let medication = web::block(move || state.catalog.get_medication(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(MedicationResponse::from(medication)))
}

#[utoipa::path(
    post,
    path = "/medications",
    request_body = CreateMedicationRequest,
    responses(
        (status = 201, description = "Medication created", body = MedicationResponse),
        (status = 400, description = "Invalid name, price, stock or category"),
    ),
    tag = "catalog"
)]
pub async fn create_medication(
    state: web::Data<AppState>,
    body: web::Json<CreateMedicationRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let new_medication = NewMedication {
        name: body.name,
        unit_price: parse_price(&body.unit_price)?,
        available_quantity: body.available_quantity,
        category_id: body.category_id,
    };

    let medication = web::block(move || state.catalog.create_medication(new_medication))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(MedicationResponse::from(medication)))
}

/// PATCH /medications/{id}
///
/// Edits a medication or sets its stock after a delivery.
#[utoipa::path(
    patch,
    path = "/medications/{id}",
    params(("id" = Uuid, Path, description = "Medication UUID")),
    request_body = UpdateMedicationRequest,
    responses(
        (status = 200, description = "Medication updated", body = MedicationResponse),
        (status = 400, description = "Nothing to change or invalid values"),
        (status = 404, description = "Medication not found"),
    ),
    tag = "catalog"
)]
pub async fn update_medication(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateMedicationRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let changes = MedicationChanges {
        name: body.name,
        unit_price: body.unit_price.as_deref().map(parse_price).transpose()?,
        available_quantity: body.available_quantity,
        category_id: body.category_id,
    };

    let medication = web::block(move || state.catalog.update_medication(id, changes))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(MedicationResponse::from(medication)))
}
