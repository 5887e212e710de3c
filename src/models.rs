use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One (user, product, quantity) row awaiting checkout. Unique per
/// (user_id, product_id); a quantity of zero deletes the row instead.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: String,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total: f64,
    pub status: String,
    pub items: Vec<OrderLine>,
    pub shipping: Option<Shipping>,
    pub payment: Option<Payment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line-item snapshot taken at checkout time; later catalog changes never
/// touch it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    #[serde(rename = "productId")]
    pub product_id: String,
    pub nombre: String,
    pub precio: f64,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagen_url: Option<String>,
}

/// Normalized shipping sub-document. Only fields the buyer actually filled
/// in are present; an entirely empty form is stored as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shipping {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apellidos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ciudad: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provincia: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pais: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_nacimiento: Option<String>,
}

impl Shipping {
    pub fn is_empty(&self) -> bool {
        self.nombre.is_none()
            && self.apellidos.is_none()
            && self.direccion.is_none()
            && self.ciudad.is_none()
            && self.provincia.is_none()
            && self.pais.is_none()
            && self.cp.is_none()
            && self.telefono.is_none()
            && self.email.is_none()
            && self.notas.is_none()
            && self.fecha_nacimiento.is_none()
    }
}

/// Normalized payment sub-document. Card data is reduced to brand + last
/// four digits; nothing here is ever charged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp_month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remember: Option<bool>,
}

impl Payment {
    /// True when any field besides the remember flag is populated.
    pub fn has_details(&self) -> bool {
        self.method.is_some()
            || self.brand.is_some()
            || self.last4.is_some()
            || self.holder.is_some()
            || self.exp_month.is_some()
            || self.exp_year.is_some()
            || self.country.is_some()
    }
}

/// Product record as served by the external catalog service. Field names are
/// the catalog's own; missing fields deserialize to conservative defaults
/// (`disponible` in particular defaults to false).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Product {
    pub id: i64,
    pub nombre: Option<String>,
    pub precio: Option<f64>,
    pub disponible: bool,
    pub imagen_url: Option<String>,
    pub stock: Option<i64>,
}
