//! Client module for the user board.
//!
//! This module handles:
//! - The HTTP client for the backend user endpoints
//! - Board state: record list, form inputs, loading and error display
//! - Mock client for testing

pub mod api;
pub mod board;
pub mod mock;

pub use api::{HttpUsersApi, UsersApi};
pub use board::{BoardCommand, SubmitOutcome, UserBoard, View};
pub use mock::MockUsersApi;
