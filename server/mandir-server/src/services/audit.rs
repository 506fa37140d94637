//! Centralized audit logging service
//!
//! Writes one `audit_logs` row per mutating action. Writes are best-effort:
//! handlers call `let _ = audit.log_action(...)` so a failed audit write
//! never fails the request.

use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthContext;

/// Centralized audit logging service
pub struct AuditService {
    db_pool: PgPool,
}

impl AuditService {
    /// Create a new audit service instance
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Log an audit action for any resource type
    pub async fn log_action(
        &self,
        auth: &AuthContext,
        resource_type: &str,
        resource_id: Uuid,
        action: &str,
        detail: Option<JsonValue>,
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, temple_id, user_id, action, resource_type, resource_id, detail, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, '{}'::jsonb), $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(auth.temple_id)
        .bind(auth.user_id)
        .bind(action)
        .bind(resource_type)
        .bind(resource_id)
        .bind(detail)
        .bind(Utc::now())
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }
}
