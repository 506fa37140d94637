//! Database layer for Mandir ERP
//!
//! Provides the PostgreSQL access layer shared by every service crate:
//!
//! - **Connection Management**: pooling via `sqlx::PgPool` with health checks
//! - **Multi-tenancy**: every query is scoped by `temple_id`; the
//!   [`TenantContext`] can additionally be applied as `app.*` session
//!   settings for database-side policies
//! - **Transactions**: a thin [`TransactionManager`] for handlers that write
//!   a domain row and its document number atomically

pub mod connection;
pub mod error;
pub mod tenant;
pub mod transaction;

pub use connection::*;
pub use error::*;
pub use tenant::*;
pub use transaction::*;
