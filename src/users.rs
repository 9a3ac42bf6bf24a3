//! User record types shared by the backend and the client.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A storage row as the database returns it, every column included.
///
/// The backend passes rows through untouched, so columns beyond `id`, `name`
/// and `email` reach the client as-is.
pub type UserRow = serde_json::Value;

/// Typed view of a user row, as read by the client.
///
/// `name` and `email` are optional because the backend does not validate
/// them and a permissive schema may store `NULL`. Unknown columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Identifier assigned by storage at insertion time.
    pub id: i64,
    /// Display name.
    pub name: Option<String>,
    /// Email address, stored as given.
    pub email: Option<String>,
}

impl User {
    /// Name for display, empty when storage holds `NULL`.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Email for display, empty when storage holds `NULL`.
    pub fn display_email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }
}

/// Payload for creating a user.
///
/// Absent fields are passed through to storage as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewUser {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
}

impl NewUser {
    /// Build a payload with both fields present.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }
}
