//! Storage layer for the Rolodex service.
//!
//! Provides the schema initializer and the per-request connection accessor
//! for the single SQLite database that holds customers and their addresses.
//!
//! # Design decisions
//!
//! - **One connection per request**: [`Database::connect`] opens a fresh
//!   handle every time. Callers own it and release it by dropping it, so a
//!   handle never outlives the request that opened it.
//! - **Idempotent schema**: the DDL is embedded via `include_str!` and uses
//!   `CREATE TABLE IF NOT EXISTS`, so [`init_schema`] can run on every start.
//! - **Deployment-agnostic location**: a file path, a copy of a bundled seed
//!   file, or `:memory:` all go through the same [`Database`] type.

mod database;
mod schema;

pub use database::{seed_database, Database, DbError, DbSettings, IN_MEMORY_PATH};
pub use schema::{init_schema, SchemaError};
