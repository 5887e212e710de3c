use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{AddToCartRequest, CartItemDto, CartList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::CartItem,
    state::AppState,
};

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<CartList> {
    let rows = sqlx::query_as::<_, CartItem>(
        "SELECT * FROM cart_items WHERE user_id = $1 ORDER BY updated_at DESC",
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    // Best-effort enrichment: a failed lookup degrades that row to
    // `product: null`, it never fails the whole list.
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let product = match state.products.get_product(&row.product_id).await {
            Ok(found) => found,
            Err(err) => {
                tracing::debug!(product_id = %row.product_id, error = %err, "enrichment failed");
                None
            }
        };
        items.push(CartItemDto { item: row, product });
    }

    Ok(CartList { items })
}

/// Add a product to the cart. Quantities merge: adding a product already in
/// the cart increases the existing row. Returns whether a new row was
/// created alongside the resulting row.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<(bool, CartItem)> {
    if payload.product_id.trim().is_empty() {
        return Err(AppError::Validation("productId is required".to_string()));
    }

    let product = state.products.get_product(&payload.product_id).await?;
    if !product.is_some_and(|p| p.disponible) {
        return Err(AppError::ProductUnavailable(payload.product_id));
    }

    let quantity = payload.quantity.unwrap_or(1).max(1);

    let existing: Option<CartItem> =
        sqlx::query_as("SELECT * FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user.user_id)
            .bind(&payload.product_id)
            .fetch_optional(&state.pool)
            .await?;

    let created = existing.is_none();
    let item: CartItem = if let Some(existing) = existing {
        sqlx::query_as(
            r#"
            UPDATE cart_items
            SET quantity = quantity + $3, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(existing.id)
        .bind(user.user_id)
        .bind(quantity)
        .fetch_one(&state.pool)
        .await?
    } else {
        sqlx::query_as(
            "INSERT INTO cart_items (id, user_id, product_id, quantity) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user.user_id)
        .bind(&payload.product_id)
        .bind(quantity)
        .fetch_one(&state.pool)
        .await?
    };

    audit::record(
        &state.pool,
        Some(user.user_id),
        "cart_update",
        "cart_items",
        serde_json::json!({ "product_id": item.product_id, "quantity": item.quantity }),
    )
    .await;

    Ok((created, item))
}

/// Overwrite a row's quantity. Zero deletes the row (and succeeds even when
/// there was nothing to delete); a positive quantity requires the row to
/// exist.
pub async fn set_quantity(
    state: &AppState,
    user: &AuthUser,
    product_id: &str,
    quantity: Option<i32>,
) -> AppResult<Option<CartItem>> {
    let quantity = quantity.ok_or_else(|| {
        AppError::Validation("quantity must be a non-negative integer".to_string())
    })?;
    if quantity < 0 {
        return Err(AppError::Validation(
            "quantity must be a non-negative integer".to_string(),
        ));
    }

    if quantity == 0 {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user.user_id)
            .bind(product_id)
            .execute(&state.pool)
            .await?;

        audit::record(
            &state.pool,
            Some(user.user_id),
            "cart_update",
            "cart_items",
            serde_json::json!({ "product_id": product_id, "quantity": 0 }),
        )
        .await;

        return Ok(None);
    }

    let updated: Option<CartItem> = sqlx::query_as(
        r#"
        UPDATE cart_items
        SET quantity = $3, updated_at = now()
        WHERE user_id = $1 AND product_id = $2
        RETURNING *
        "#,
    )
    .bind(user.user_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_optional(&state.pool)
    .await?;

    let item = updated.ok_or(AppError::NotFound)?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "cart_update",
        "cart_items",
        serde_json::json!({ "product_id": product_id, "quantity": item.quantity }),
    )
    .await;

    Ok(Some(item))
}

/// Idempotent removal: deleting an absent row is still a success.
pub async fn remove_item(state: &AppState, user: &AuthUser, product_id: &str) -> AppResult<()> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
        .bind(user.user_id)
        .bind(product_id)
        .execute(&state.pool)
        .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "cart_remove",
        "cart_items",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(())
}
