use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::sale::SaleReceipt;
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddProductRequest {
    /// Cart to add to. Omit to open a new cart.
    pub cart_id: Option<Uuid>,
    pub medication_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineResponse {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub medication_name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub subtotal: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub cart_id: Uuid,
    pub item_count: usize,
    pub total: String,
    pub lines: Vec<CartLineResponse>,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        Self {
            cart_id: cart.sale_id(),
            item_count: cart.item_count(),
            total: cart.total().to_string(),
            lines: cart
                .line_items()
                .iter()
                .map(|l| CartLineResponse {
                    id: l.id,
                    medication_id: l.medication_id,
                    medication_name: l.medication_name.clone(),
                    quantity: l.quantity,
                    unit_price: l.unit_price.to_string(),
                    subtotal: l.subtotal().to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleReceiptResponse {
    pub sale_id: Uuid,
    pub sold_at: String,
    pub total: String,
    pub line_count: usize,
}

impl From<SaleReceipt> for SaleReceiptResponse {
    fn from(receipt: SaleReceipt) -> Self {
        Self {
            sale_id: receipt.sale_id,
            sold_at: receipt.sold_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            total: receipt.total.to_string(),
            line_count: receipt.line_count,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /carts/items
///
/// Adds a medication to a cart. Without `cart_id` a new cart is opened; its
/// id is the future sale id. The requested quantity is checked against the
/// stock available right now.
#[utoipa::path(
    post,
    path = "/carts/items",
    request_body = AddProductRequest,
    responses(
        (status = 201, description = "New cart opened with the product", body = CartResponse),
        (status = 200, description = "Product added to the cart", body = CartResponse),
        (status = 400, description = "Quantity below 1"),
        (status = 404, description = "Cart or medication not found"),
        (status = 409, description = "Not enough stock"),
    ),
    tag = "carts"
)]
pub async fn add_product(
    state: web::Data<AppState>,
    body: web::Json<AddProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let opened = body.cart_id.is_none();

    let cart = web::block(move || {
        let medication = state
            .catalog
            .select_for_sale(body.medication_id, body.quantity)?;
        state
            .carts
            .add_product(body.cart_id, &medication, body.quantity)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let response = CartResponse::from(&cart);
    if opened {
        Ok(HttpResponse::Created().json(response))
    } else {
        Ok(HttpResponse::Ok().json(response))
    }
}

/// GET /carts/{id}
#[utoipa::path(
    get,
    path = "/carts/{id}",
    params(("id" = Uuid, Path, description = "Cart (sale) UUID")),
    responses(
        (status = 200, description = "Cart contents", body = CartResponse),
        (status = 404, description = "Cart not found"),
    ),
    tag = "carts"
)]
pub async fn get_cart(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let cart = state.carts.get(path.into_inner())?;
    Ok(HttpResponse::Ok().json(CartResponse::from(&cart)))
}

/// DELETE /carts/{id}/items/{line_id}
///
/// Removing a line that is not in the cart is not an error.
#[utoipa::path(
    delete,
    path = "/carts/{id}/items/{line_id}",
    params(
        ("id" = Uuid, Path, description = "Cart (sale) UUID"),
        ("line_id" = Uuid, Path, description = "Cart line UUID"),
    ),
    responses(
        (status = 200, description = "Cart after removal", body = CartResponse),
        (status = 404, description = "Cart not found"),
    ),
    tag = "carts"
)]
pub async fn remove_product(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (cart_id, line_id) = path.into_inner();
    let cart = state.carts.remove_product(cart_id, line_id)?;
    Ok(HttpResponse::Ok().json(CartResponse::from(&cart)))
}

/// DELETE /carts/{id}
///
/// Cancels the sale and discards the cart.
#[utoipa::path(
    delete,
    path = "/carts/{id}",
    params(("id" = Uuid, Path, description = "Cart (sale) UUID")),
    responses(
        (status = 204, description = "Cart discarded"),
        (status = 404, description = "Cart not found"),
    ),
    tag = "carts"
)]
pub async fn cancel_cart(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.carts.cancel(path.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /carts/{id}/checkout
///
/// Writes the cart as a sale in one transaction. On failure the cart is kept
/// so the checkout can be retried as is.
#[utoipa::path(
    post,
    path = "/carts/{id}/checkout",
    params(("id" = Uuid, Path, description = "Cart (sale) UUID")),
    responses(
        (status = 201, description = "Sale saved", body = SaleReceiptResponse),
        (status = 400, description = "Cart is empty"),
        (status = 404, description = "Cart not found"),
        (status = 409, description = "Stock ran out since the product was added"),
        (status = 500, description = "Sale not saved, retry"),
    ),
    tag = "carts"
)]
pub async fn checkout(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let cart_id = path.into_inner();

    let receipt = web::block(move || {
        let cart = state.carts.take(cart_id)?;
        match state.sales.commit_sale(&cart, state.clock.as_ref()) {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                log::warn!("Checkout of cart {} failed, keeping cart for retry", cart_id);
                state.carts.restore(cart);
                Err(e)
            }
        }
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(SaleReceiptResponse::from(receipt)))
}
