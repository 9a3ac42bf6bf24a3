//! User persistence behind the shared connection.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::metrics::{self, QueryTimer};
use crate::users::{NewUser, UserRow};

use super::connection::ConnectionManager;

/// Maximum number of rows returned by a list query.
pub const LIST_LIMIT: i64 = 10;

// Rows are returned whole as JSON objects, whatever the table's columns and
// their types. No ORDER BY: rows come back in the storage engine's scan order.
const LIST_USERS_SQL: &str = "SELECT row_to_json(u) FROM (SELECT * FROM users LIMIT $1) AS u";
const INSERT_USER_SQL: &str = "WITH inserted AS \
     (INSERT INTO users (name, email) VALUES ($1, $2) RETURNING *) \
     SELECT row_to_json(inserted) FROM inserted";

/// Storage operations used by the HTTP handlers.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Up to [`LIST_LIMIT`] rows, order unspecified.
    async fn list_users(&self) -> Result<Vec<UserRow>, StoreError>;

    /// Insert a user and return the stored row with its assigned id.
    async fn create_user(&self, new_user: NewUser) -> Result<UserRow, StoreError>;
}

/// PostgreSQL-backed user store.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    connection: Arc<ConnectionManager>,
}

impl PgUserStore {
    /// Create a store on the shared connection.
    pub fn new(connection: Arc<ConnectionManager>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<UserRow>, StoreError> {
        let mut conn = self.connection.acquire().await?;
        let _timer = QueryTimer::new("list_users");

        let rows = sqlx::query_scalar::<_, UserRow>(LIST_USERS_SQL)
            .bind(LIST_LIMIT)
            .fetch_all(&mut *conn)
            .await?;

        debug!(count = rows.len(), "Listed users");
        Ok(rows)
    }

    #[instrument(skip(self, new_user))]
    async fn create_user(&self, new_user: NewUser) -> Result<UserRow, StoreError> {
        let mut conn = self.connection.acquire().await?;
        let _timer = QueryTimer::new("create_user");

        let row = sqlx::query_scalar::<_, UserRow>(INSERT_USER_SQL)
            .bind(new_user.name)
            .bind(new_user.email)
            .fetch_one(&mut *conn)
            .await?;

        metrics::inc_users_created();
        debug!(id = %row["id"], "Inserted user");
        Ok(row)
    }
}
