use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{CartItem, Product};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    #[serde(default)]
    pub product_id: String,
    /// Defaults to 1; values below 1 are floored to 1.
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub quantity: Option<i32>,
}

/// Cart row plus its best-effort product enrichment (`product` is null when
/// the catalog lookup failed).
#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemDto {
    #[serde(flatten)]
    pub item: CartItem,
    pub product: Option<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CartList {
    #[schema(value_type = Vec<CartItemDto>)]
    pub items: Vec<CartItemDto>,
}
