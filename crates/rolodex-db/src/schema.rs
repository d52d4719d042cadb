//! Embedded schema initializer.
//!
//! The schema is a single SQL file compiled into the binary. Every statement
//! is guarded with `IF NOT EXISTS`, so running it against an initialized
//! database is a no-op.

use rusqlite::Connection;
use thiserror::Error;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Errors that can occur while ensuring the schema exists.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A DDL statement was rejected by SQLite (e.g. read-only medium).
    #[error("failed to initialize database schema: {0}")]
    Init(#[from] rusqlite::Error),
}

/// Ensures the `customers` and `addresses` tables exist.
///
/// # Errors
///
/// Returns `SchemaError::Init` if the storage medium rejects the DDL.
pub fn init_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    tracing::info!("database schema ready");
    Ok(())
}
