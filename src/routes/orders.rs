use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::orders::{CheckoutRequest, OrderList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Order,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/checkout", post(checkout))
}

#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Orders for the current user, newest first. Line items are the snapshots taken at purchase time.", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let data = order_service::list_orders(&state, &user).await?;
    Ok(Json(ApiResponse::new(data)))
}

#[utoipa::path(
    post,
    path = "/orders/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order created from the cart; the cart is cleared", body = ApiResponse<Order>),
        (status = 400, description = "Empty cart, or a product is no longer available"),
        (status = 502, description = "Product catalog unreachable"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let order = order_service::checkout(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(order))))
}
