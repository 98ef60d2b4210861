use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::{CreateOrderInput, OrderService};
use crate::db::DbPool;
use crate::domain::order::{CartLine, OrderLineView, OrderView};
use crate::errors::AppError;
use crate::infrastructure::catalog_repo::DieselCatalogLookup;
use crate::infrastructure::order_repo::DieselOrderRepository;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    /// Product UUID, or the legacy external identifier for seeded catalog rows
    pub product_ref: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    /// Decimal total as a string to avoid floating-point issues, e.g. "179.98"
    pub total_amount: String,
    /// One of COD, CARD, UPI; defaults to COD
    pub payment_method: Option<String>,
    pub shipping_address: Value,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitReviewRequest {
    pub rating: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub title: String,
    pub image: String,
    pub category: String,
    pub quantity: i32,
    pub unit_price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_number: String,
    pub items: Vec<OrderItemResponse>,
    pub total_amount: String,
    pub status: String,
    pub payment_method: String,
    pub payment_status: String,
    pub shipping_address: Value,
    pub has_reviewed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        OrderResponse {
            id: order.id,
            user_id: order.user_id,
            order_number: order.order_number,
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            total_amount: order.total_amount.to_string(),
            status: order.status.as_str().to_string(),
            payment_method: order.payment_method.as_str().to_string(),
            payment_status: order.payment_status.as_str().to_string(),
            shipping_address: order.shipping_address,
            has_reviewed: order.has_reviewed,
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
        }
    }
}

impl From<OrderLineView> for OrderItemResponse {
    fn from(line: OrderLineView) -> Self {
        OrderItemResponse {
            id: line.id,
            product_id: line.product_id,
            title: line.title,
            image: line.image,
            category: line.category,
            quantity: line.quantity,
            unit_price: line.unit_price.to_string(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
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
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// The identity collaborator puts a trusted user id on the request; no
/// credential verification happens here.
fn require_user(req: &HttpRequest) -> Result<Uuid, AppError> {
    req.headers()
        .get("X-User-Id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .ok_or(AppError::Unauthorized)
}

fn order_service(pool: &DbPool) -> OrderService<DieselOrderRepository, DieselCatalogLookup> {
    OrderService::new(
        DieselOrderRepository::new(pool.clone()),
        DieselCatalogLookup::new(pool.clone()),
    )
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Validates the cart, snapshots catalog prices into the order lines, and
/// persists the order atomically with a freshly generated order number.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Malformed cart or total"),
        (status = 401, description = "Missing identity"),
        (status = 404, description = "Unresolvable product reference"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    pool: web::Data<DbPool>,
    req: HttpRequest,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = require_user(&req)?;
    let body = body.into_inner();

    let order = web::block(move || {
        let input = CreateOrderInput {
            lines: body
                .items
                .into_iter()
                .map(|item| CartLine {
                    product_ref: item.product_ref,
                    quantity: item.quantity,
                })
                .collect(),
            total_amount: body.total_amount,
            payment_method: body.payment_method,
            shipping_address: body.shipping_address,
        };
        order_service(&pool).create_order(user_id, input)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || order_service(&pool).get_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// Paginated list of orders with their lines, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    pool: web::Data<DbPool>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);

    let result = web::block(move || order_service(&pool).list_orders(page, limit))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(OrderResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// PUT /orders/{id}/status
///
/// Applies a status transition. Any of the five enumerated statuses is a
/// valid next state; anything else is rejected before persistence.
#[utoipa::path(
    put,
    path = "/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OrderResponse),
        (status = 400, description = "Status outside the enumerated set"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn update_status(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let body = body.into_inner();

    let order = web::block(move || order_service(&pool).update_status(order_id, &body.status))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// POST /orders/{id}/review
///
/// Marks a Delivered order as reviewed, exactly once.
#[utoipa::path(
    post,
    path = "/orders/{id}/review",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = SubmitReviewRequest,
    responses(
        (status = 204, description = "Review recorded"),
        (status = 400, description = "Rating out of range"),
        (status = 404, description = "Order not found or not owned by caller"),
        (status = 409, description = "Order not Delivered, or already reviewed"),
    ),
    tag = "orders"
)]
pub async fn submit_review(
    pool: web::Data<DbPool>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<SubmitReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = require_user(&req)?;
    let order_id = path.into_inner();
    let rating = body.into_inner().rating;

    web::block(move || order_service(&pool).submit_review(order_id, user_id, rating))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}
