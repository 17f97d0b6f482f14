/// Persistence layer for the hub and the target API
///
/// Validators, monitored targets and observation ticks live in a libsql
/// (SQLite) database reached through a deadpool connection pool. Callers
/// only see the [`Store`] trait.
pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod repository;

pub use error::{Result, StoreError};
pub use models::{
    MonitoredTarget, NewTick, NewValidator, ObservationTick, TargetWithTicks, User, Validator,
};
pub use pool::{LibsqlManager, LibsqlPool, open_pool};
pub use repository::{Store, StoreImpl};

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    migrations::run_migrations(conn).await
}
