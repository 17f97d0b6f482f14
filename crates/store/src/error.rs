use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] libsql::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] deadpool::managed::PoolError<libsql::Error>),
    #[error("failed to build connection pool: {0}")]
    Build(#[from] deadpool::managed::BuildError),
    #[error("validator {0} does not exist")]
    ValidatorNotFound(String),
    #[error("latency {0} ms does not fit the ticks table")]
    LatencyOutOfRange(u64),
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
