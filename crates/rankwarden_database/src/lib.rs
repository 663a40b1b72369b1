//! PostgreSQL integration for Rankwarden.
//!
//! This crate provides the pooled store client and the rank store built on it.
//!
//! # Features
//!
//! - Diesel + r2d2 connection pooling with a bounded set of blocking workers
//! - Health checks with a fixed timeout
//! - `RankStore` trait with PostgreSQL and in-memory implementations
//!
//! # Example
//!
//! ```rust,no_run
//! use rankwarden_database::{PostgresRankStore, RankStore, StoreClient, StoreConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = StoreClient::connect(&StoreConfig::default())?;
//! if !client.health_check().await {
//!     return Err("database unavailable".into());
//! }
//! let store = PostgresRankStore::new(client.clone());
//! store.ensure_schema().await?;
//! client.disconnect();
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod memory;
mod postgres;
mod store;

pub use client::{HEALTH_CHECK_TIMEOUT, PgPool, StoreClient};
pub use config::{StoreConfig, StoreConfigBuilder, StoreConfigBuilderError};
pub use memory::{InMemoryRankStore, StoreOperation};
pub use postgres::{PostgresRankStore, RANK_TABLE_NAME};
pub use store::RankStore;

use rankwarden_error::DatabaseError;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
