//! Database module.
//!
//! This module handles:
//! - The single shared connection and its startup retry loop
//! - The user store used by the HTTP handlers
//! - An in-memory store for testing

pub mod connection;
pub mod mock;
pub mod store;

pub use connection::{retry_forever, ConnectionManager, ConnectionState, DEFAULT_RETRY_DELAY};
pub use mock::{MemoryStoreConfig, MemoryUserStore};
pub use store::{PgUserStore, UserStore, LIST_LIMIT};
