//! Mock backend client for unit testing the board.
//!
//! Clones share state, so a test can keep a handle to inspect call counts
//! after moving a clone into the board.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::ClientError;
use crate::users::{NewUser, User};

use super::api::UsersApi;

#[derive(Debug, Default)]
struct MockState {
    users: Mutex<Vec<User>>,
    fail_list: AtomicBool,
    fail_create: AtomicBool,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

/// Mock backend for testing.
#[derive(Debug, Clone, Default)]
pub struct MockUsersApi {
    state: Arc<MockState>,
}

impl MockUsersApi {
    /// Create a mock with no users.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that already holds `users`.
    pub fn with_users(users: Vec<User>) -> Self {
        let mock = Self::new();
        *mock.users() = users;
        mock
    }

    /// Make list requests fail.
    pub fn set_fail_list(&self, fail: bool) {
        self.state.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Make create requests fail.
    pub fn set_fail_create(&self, fail: bool) {
        self.state.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Add a user as if another client created it.
    pub fn push_user(&self, user: User) {
        self.users().push(user);
    }

    /// Number of list requests received.
    pub fn list_calls(&self) -> usize {
        self.state.list_calls.load(Ordering::SeqCst)
    }

    /// Number of create requests received.
    pub fn create_calls(&self) -> usize {
        self.state.create_calls.load(Ordering::SeqCst)
    }

    fn users(&self) -> std::sync::MutexGuard<'_, Vec<User>> {
        match self.state.users.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn failure(body: &str) -> ClientError {
        ClientError::Status {
            status: 500,
            body: body.to_string(),
        }
    }
}

#[async_trait]
impl UsersApi for MockUsersApi {
    async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.state.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_list.load(Ordering::SeqCst) {
            return Err(Self::failure("mock list failure"));
        }
        Ok(self.users().clone())
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<User, ClientError> {
        self.state.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_create.load(Ordering::SeqCst) {
            return Err(Self::failure("mock create failure"));
        }

        let mut users = self.users();
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = User {
            id,
            name: new_user.name.clone(),
            email: new_user.email.clone(),
        };
        users.push(user.clone());
        Ok(user)
    }
}
