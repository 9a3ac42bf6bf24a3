//! Three-tier user board.
//!
//! A REST backend lists and creates user records stored in PostgreSQL, and a
//! terminal client renders the list with a creation form.
//!
//! ```text
//! client ──HTTP──▶ backend ──SQL──▶ postgres
//!   ▲                 │
//!   └──── JSON ◀──────┘
//! ```
//!
//! The backend holds a single database connection. It starts serving
//! `/health` immediately and keeps retrying the connection every five seconds
//! until the database accepts it.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`users`]: User record types
//! - [`db`]: Connection manager and user store
//! - [`api`]: HTTP API for health, users, metrics
//! - [`client`]: Backend client and board state
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Logging and shutdown helpers

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod users;
pub mod utils;

pub use config::{ClientConfig, Config};
pub use error::{AppError, Result};
