//! HTTP API module for health, user, metrics and docs endpoints.

pub mod cors;
pub mod docs;
pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
