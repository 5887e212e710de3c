use std::time::Duration;

use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::Product,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Thin accessor for the external product catalog service.
#[derive(Clone)]
pub struct ProductClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProductClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a product by id. A 404 from the catalog maps to `None`; timeouts
    /// and other failures surface as upstream errors for the caller to decide
    /// whether to hard-fail (checkout) or degrade (list enrichment).
    pub async fn get_product(&self, product_id: &str) -> AppResult<Option<Product>> {
        let url = format!("{}/products/{}", self.base_url, product_id);
        let response = self.http.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: Value = response.error_for_status()?.json().await?;
        let product = serde_json::from_value(unwrap_envelope(body))
            .map_err(|err| AppError::Internal(anyhow::anyhow!("malformed product payload: {err}")))?;
        Ok(Some(product))
    }
}

/// The catalog answers either the bare product object or `{ "data": ... }`.
fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::unwrap_envelope;
    use crate::models::Product;
    use serde_json::json;

    #[test]
    fn accepts_enveloped_and_bare_payloads() {
        let enveloped = json!({ "data": { "id": 7, "nombre": "Botas", "precio": 59.9, "disponible": true } });
        let bare = json!({ "id": 7, "nombre": "Botas", "precio": 59.9, "disponible": true });

        for body in [enveloped, bare] {
            let product: Product = serde_json::from_value(unwrap_envelope(body)).unwrap();
            assert_eq!(product.id, 7);
            assert_eq!(product.nombre.as_deref(), Some("Botas"));
            assert_eq!(product.precio, Some(59.9));
            assert!(product.disponible);
        }
    }

    #[test]
    fn missing_fields_default_to_unavailable() {
        let product: Product = serde_json::from_value(unwrap_envelope(json!({ "id": 1 }))).unwrap();
        assert!(!product.disponible);
        assert_eq!(product.precio, None);
    }
}
