use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::favorites::FavoriteList,
    error::AppResult,
    middleware::auth::AuthUser,
    models::Favorite,
    response::ApiResponse,
    services::favorite_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_favorites)).route(
        "/{product_id}",
        post(add_favorite).delete(remove_favorite),
    )
}

#[utoipa::path(
    get,
    path = "/favorites",
    responses(
        (status = 200, description = "Favorites for the current user, newest first, each with its live product (null when the catalog lookup failed)", body = ApiResponse<FavoriteList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn list_favorites(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<FavoriteList>>> {
    let data = favorite_service::list_favorites(&state, &user).await?;
    Ok(Json(ApiResponse::new(data)))
}

#[utoipa::path(
    post,
    path = "/favorites/{product_id}",
    params(
        ("product_id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 201, description = "Favorite row (upsert: adding twice keeps one row)", body = ApiResponse<Favorite>),
        (status = 400, description = "Missing productId"),
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn add_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<String>,
) -> AppResult<(StatusCode, Json<ApiResponse<Favorite>>)> {
    let favorite = favorite_service::add_favorite(&state, &user, &product_id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(favorite))))
}

#[utoipa::path(
    delete,
    path = "/favorites/{product_id}",
    params(
        ("product_id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Removed from favorites (idempotent)", body = ApiResponse<serde_json::Value>),
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    favorite_service::remove_favorite(&state, &user, &product_id).await?;
    Ok(Json(ApiResponse::none()))
}
