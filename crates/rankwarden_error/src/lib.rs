//! Error types for the Rankwarden workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use rankwarden_error::{ConfigError, RankwardenResult};
//!
//! fn load_port() -> RankwardenResult<u16> {
//!     Err(ConfigError::new("database.port is missing"))?
//! }
//!
//! match load_port() {
//!     Ok(port) => println!("Port: {}", port),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod permission;

pub use config::ConfigError;
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{RankwardenError, RankwardenErrorKind, RankwardenResult};
pub use permission::{PermissionError, PermissionErrorKind};
