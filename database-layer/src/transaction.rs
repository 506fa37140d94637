// Transaction management with tenant context application
use crate::connection::DatabasePool;
use crate::error::{DatabaseError, DatabaseResult};
use crate::tenant::TenantContext;
use sqlx::{Postgres, Transaction};
use tracing::debug;

/// Transaction manager with automatic tenant context application
pub struct TransactionManager {
    pool: DatabasePool,
    tenant_context: Option<TenantContext>,
}

impl TransactionManager {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            pool,
            tenant_context: None,
        }
    }

    /// Set tenant context for this transaction
    pub fn with_tenant_context(mut self, context: TenantContext) -> Self {
        self.tenant_context = Some(context);
        self
    }

    /// Begin a new transaction
    pub async fn begin(&self) -> DatabaseResult<Transaction<'_, Postgres>> {
        debug!("Beginning transaction");

        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| DatabaseError::QueryFailed(format!("Failed to begin transaction: {}", e)))?;

        if let Some(context) = &self.tenant_context {
            sqlx::query("SELECT set_config('app.current_user_id', $1, true), set_config('app.current_temple_id', $2, true)")
                .bind(context.user_id.to_string())
                .bind(context.temple_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    DatabaseError::QueryFailed(format!("Failed to apply tenant context: {}", e))
                })?;
        }

        Ok(tx)
    }
}
