use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{CheckoutRequest, OrderList},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderLine},
    normalize::{build_payment, build_shipping},
    state::AppState,
};

pub async fn list_orders(state: &AppState, user: &AuthUser) -> AppResult<OrderList> {
    let items = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(OrderList { items })
}

/// Turn the cart into an order: re-verify every line against the live
/// catalog, snapshot name/price/image, persist, then sweep the cart.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<Order> {
    let cart_rows = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .order_by_asc(CartCol::CreatedAt)
        .all(&state.orm)
        .await?;

    if cart_rows.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let shipping = build_shipping(&payload.shipping.unwrap_or_default());
    let payment = build_payment(&payload.payment.unwrap_or_default());

    // Any line failing validation aborts the whole checkout before anything
    // is written; the cart stays untouched.
    let mut lines: Vec<OrderLine> = Vec::with_capacity(cart_rows.len());
    let mut total = 0.0_f64;
    for row in &cart_rows {
        let product = state
            .products
            .get_product(&row.product_id)
            .await?
            .filter(|product| product.disponible)
            .ok_or_else(|| AppError::ProductUnavailable(row.product_id.clone()))?;

        let precio = product.precio.unwrap_or(0.0);
        total += precio * f64::from(row.quantity);
        lines.push(OrderLine {
            product_id: row.product_id.clone(),
            nombre: product.nombre.unwrap_or_else(|| "Producto".to_string()),
            precio,
            quantity: row.quantity,
            imagen_url: product.imagen_url,
        });
    }

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        total: Set(total),
        status: Set("created".to_string()),
        items: Set(encode(&lines)?),
        shipping: Set(shipping.as_ref().map(encode).transpose()?),
        payment: Set(payment.as_ref().map(encode).transpose()?),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    // No transaction spans the insert and the sweep: a crash in between
    // leaves the order alongside a populated cart, and the sweep is safe to
    // retry.
    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "total": order.total }),
    )
    .await;

    order_from_entity(order)
}

fn encode<T: Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value)
        .map_err(|err| AppError::Internal(anyhow::anyhow!("order snapshot encode: {err}")))
}

fn decode<T: serde::de::DeserializeOwned>(value: Value, column: &str) -> AppResult<T> {
    serde_json::from_value(value)
        .map_err(|err| AppError::Internal(anyhow::anyhow!("corrupt {column} column: {err}")))
}

fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        total: model.total,
        status: model.status,
        items: decode(model.items, "items")?,
        shipping: model
            .shipping
            .map(|value| decode(value, "shipping"))
            .transpose()?,
        payment: model
            .payment
            .map(|value| decode(value, "payment"))
            .transpose()?,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}
