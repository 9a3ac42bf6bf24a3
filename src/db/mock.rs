//! In-memory user store for unit and integration testing.
//!
//! Mirrors the PostgreSQL store without a database: sequential ids, a list
//! capped at [`LIST_LIMIT`], whole rows as JSON objects, and optional NOT NULL
//! style rejection.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::error::StoreError;
use crate::users::{NewUser, UserRow};

use super::store::{UserStore, LIST_LIMIT};

/// Configuration for mock store behavior.
#[derive(Debug, Clone, Default)]
pub struct MemoryStoreConfig {
    /// Reject inserts with a missing name or email, like NOT NULL columns.
    pub require_fields: bool,
    /// Fail every list query.
    pub fail_list: bool,
    /// Fail every insert.
    pub fail_create: bool,
    /// Columns added to every inserted row, like column defaults.
    pub extra_columns: Map<String, Value>,
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<UserRow>,
    next_id: i64,
}

/// In-memory user store.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    config: MemoryStoreConfig,
    table: Arc<Mutex<Table>>,
}

impl MemoryUserStore {
    /// Create an empty store with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with custom configuration.
    pub fn with_config(config: MemoryStoreConfig) -> Self {
        Self {
            config,
            table: Arc::default(),
        }
    }

    /// Total rows stored, ignoring the list limit.
    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Table> {
        // A poisoned lock only means a test panicked mid-insert.
        match self.table.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list_users(&self) -> Result<Vec<UserRow>, StoreError> {
        if self.config.fail_list {
            return Err(StoreError::Rejected("mock list failure".to_string()));
        }

        let table = self.lock();
        Ok(table.rows.iter().take(LIST_LIMIT as usize).cloned().collect())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserRow, StoreError> {
        if self.config.fail_create {
            return Err(StoreError::Rejected("mock insert failure".to_string()));
        }

        if self.config.require_fields {
            if new_user.name.is_none() {
                return Err(StoreError::Rejected(
                    "null value in column \"name\" violates not-null constraint".to_string(),
                ));
            }
            if new_user.email.is_none() {
                return Err(StoreError::Rejected(
                    "null value in column \"email\" violates not-null constraint".to_string(),
                ));
            }
        }

        let mut table = self.lock();
        table.next_id += 1;
        let mut row = self.config.extra_columns.clone();
        row.insert("id".to_string(), json!(table.next_id));
        row.insert("name".to_string(), json!(new_user.name));
        row.insert("email".to_string(), json!(new_user.email));

        let row = Value::Object(row);
        table.rows.push(row.clone());
        Ok(row)
    }
}
