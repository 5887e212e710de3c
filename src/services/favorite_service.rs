use uuid::Uuid;

use crate::{
    audit,
    dto::favorites::{FavoriteDto, FavoriteList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Favorite,
    state::AppState,
};

pub async fn list_favorites(state: &AppState, user: &AuthUser) -> AppResult<FavoriteList> {
    let rows = sqlx::query_as::<_, Favorite>(
        "SELECT * FROM favorites WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let product = match state.products.get_product(&row.product_id).await {
            Ok(found) => found,
            Err(err) => {
                tracing::debug!(product_id = %row.product_id, error = %err, "enrichment failed");
                None
            }
        };
        items.push(FavoriteDto {
            favorite: row,
            product,
        });
    }

    Ok(FavoriteList { items })
}

/// Upsert: adding an already-favorited product returns the existing row.
pub async fn add_favorite(
    state: &AppState,
    user: &AuthUser,
    product_id: &str,
) -> AppResult<Favorite> {
    if product_id.trim().is_empty() {
        return Err(AppError::Validation("productId is required".to_string()));
    }

    let inserted: Option<Favorite> = sqlx::query_as(
        r#"
        INSERT INTO favorites (id, user_id, product_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, product_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(product_id)
    .fetch_optional(&state.pool)
    .await?;

    let favorite = match inserted {
        Some(row) => row,
        None => {
            sqlx::query_as("SELECT * FROM favorites WHERE user_id = $1 AND product_id = $2")
                .bind(user.user_id)
                .bind(product_id)
                .fetch_one(&state.pool)
                .await?
        }
    };

    audit::record(
        &state.pool,
        Some(user.user_id),
        "favorite_add",
        "favorites",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(favorite)
}

/// Idempotent removal: deleting an absent favorite is still a success.
pub async fn remove_favorite(
    state: &AppState,
    user: &AuthUser,
    product_id: &str,
) -> AppResult<()> {
    sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND product_id = $2")
        .bind(user.user_id)
        .bind(product_id)
        .execute(&state.pool)
        .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "favorite_remove",
        "favorites",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(())
}
