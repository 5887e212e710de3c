use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
};

use crate::{
    dto::cart::{AddToCartRequest, CartList, UpdateQuantityRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::CartItem,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cart_list))
        .route("/items", post(add_to_cart))
        .route(
            "/items/{product_id}",
            patch(update_quantity).delete(remove_from_cart),
        )
}

#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "Cart rows for the current user, newest update first, each with its live product (null when the catalog lookup failed)", body = ApiResponse<CartList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartList>>> {
    let data = cart_service::list_cart(&state, &user).await?;
    Ok(Json(ApiResponse::new(data)))
}

#[utoipa::path(
    post,
    path = "/cart/items",
    request_body = AddToCartRequest,
    responses(
        (status = 201, description = "New cart row created", body = ApiResponse<CartItem>),
        (status = 200, description = "Quantity merged into the existing row", body = ApiResponse<CartItem>),
        (status = 400, description = "Missing productId or product not available"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CartItem>>)> {
    let (created, item) = cart_service::add_to_cart(&state, &user, payload).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ApiResponse::new(item))))
}

#[utoipa::path(
    patch,
    path = "/cart/items/{product_id}",
    params(
        ("product_id" = String, Path, description = "Product ID")
    ),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Row updated, or deleted when quantity is 0 (data is null)", body = ApiResponse<CartItem>),
        (status = 400, description = "Quantity missing or negative"),
        (status = 404, description = "No cart row for this product"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_quantity(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<String>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let item = cart_service::set_quantity(&state, &user, &product_id, payload.quantity).await?;
    Ok(Json(ApiResponse { data: item }))
}

#[utoipa::path(
    delete,
    path = "/cart/items/{product_id}",
    params(
        ("product_id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Removed from cart (idempotent)", body = ApiResponse<serde_json::Value>),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    cart_service::remove_item(&state, &user, &product_id).await?;
    Ok(Json(ApiResponse::none()))
}
