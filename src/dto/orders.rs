use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Order;

/// Raw shipping form exactly as submitted; normalization happens in
/// `normalize::build_shipping`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingInput {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub direccion: Option<String>,
    pub ciudad: Option<String>,
    pub provincia: Option<String>,
    pub pais: Option<String>,
    pub cp: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub notas: Option<String>,
    pub fecha_nacimiento: Option<String>,
}

/// Raw payment form; the full card number is reduced to brand + last4 before
/// anything is stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentInput {
    pub method: Option<String>,
    pub brand: Option<String>,
    pub card_number: Option<String>,
    pub last4: Option<String>,
    pub holder: Option<String>,
    pub exp_month: Option<String>,
    pub exp_year: Option<String>,
    pub country: Option<String>,
    pub remember: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CheckoutRequest {
    pub shipping: Option<ShippingInput>,
    pub payment: Option<PaymentInput>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}
