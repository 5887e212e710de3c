use serde_json::Value;
use uuid::Uuid;

use crate::db::DbPool;

/// Append a best-effort audit trail entry. Audit writes must never fail the
/// request they describe: errors are logged and dropped here.
pub async fn record(
    pool: &DbPool,
    user_id: Option<Uuid>,
    action: &str,
    resource: &str,
    metadata: Value,
) {
    let result = sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(action)
    .bind(resource)
    .bind(metadata)
    .execute(pool)
    .await;

    if let Err(err) = result {
        tracing::warn!(action, error = %err, "audit log failed");
    }
}
