use serde::Serialize;
use utoipa::ToSchema;

/// Success envelope consumed by the frontend: `{ "data": ... }`.
/// Error responses are built in `error.rs` and carry `{ "message": ... }`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data: Some(data) }
    }

    /// `{ "data": null }`, used by the idempotent delete endpoints.
    pub fn none() -> Self {
        Self { data: None }
    }
}
