use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Favorite, Product};

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteDto {
    #[serde(flatten)]
    pub favorite: Favorite,
    pub product: Option<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FavoriteList {
    #[schema(value_type = Vec<FavoriteDto>)]
    pub items: Vec<FavoriteDto>,
}
