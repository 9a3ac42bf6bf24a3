//! Integration tests for the user board.
//!
//! The in-process tests bind the real router to a local port and drive it with
//! the real HTTP client. Tests against PostgreSQL need a reachable database
//! configured through the usual `DB_*` variables.
//! Run with: cargo test --test integration -- --ignored

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

use userboard::api::{create_router, AppState};
use userboard::client::{HttpUsersApi, SubmitOutcome, UserBoard, UsersApi};
use userboard::config::Config;
use userboard::db::{
    ConnectionManager, ConnectionState, MemoryStoreConfig, MemoryUserStore, PgUserStore,
    UserStore,
};
use userboard::error::ClientError;
use userboard::users::NewUser;

/// Serve `store` on an ephemeral port and return its base URL.
async fn spawn_backend(store: Arc<dyn UserStore>) -> Url {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let router = create_router(AppState::new(store));

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    Url::parse(&format!("http://{addr}")).unwrap()
}

#[tokio::test]
async fn end_to_end_create_then_list() {
    let base = spawn_backend(Arc::new(MemoryUserStore::new())).await;
    let api = HttpUsersApi::new(&base).unwrap();

    let created = api
        .create_user(&NewUser::new("Ada", "ada@example.com"))
        .await
        .unwrap();
    assert_eq!(created.name.as_deref(), Some("Ada"));
    assert_eq!(created.email.as_deref(), Some("ada@example.com"));

    let users = api.list_users().await.unwrap();
    assert!(users.contains(&created));
}

#[tokio::test]
async fn each_create_gets_a_fresh_id() {
    let base = spawn_backend(Arc::new(MemoryUserStore::new())).await;
    let api = HttpUsersApi::new(&base).unwrap();

    let mut seen = Vec::new();
    for i in 0..3 {
        let user = api
            .create_user(&NewUser::new(format!("user{i}"), format!("u{i}@example.com")))
            .await
            .unwrap();
        assert!(!seen.contains(&user.id));
        seen.push(user.id);
    }
}

#[tokio::test]
async fn board_round_trip_over_http() {
    let base = spawn_backend(Arc::new(MemoryUserStore::new())).await;
    let mut board = UserBoard::new(HttpUsersApi::new(&base).unwrap());

    board.mount().await;
    assert!(board.users().is_empty());
    assert!(board.render().contains("No users"));

    board.set_name("Ada");
    board.set_email("ada@example.com");
    let outcome = board.submit().await;

    assert!(matches!(outcome, SubmitOutcome::Created(_)));
    assert_eq!(board.users().len(), 1);
    assert!(board.render().contains("- Ada - ada@example.com"));
}

#[tokio::test]
async fn server_error_surfaces_status_to_client() {
    let store = MemoryUserStore::with_config(MemoryStoreConfig {
        fail_list: true,
        ..Default::default()
    });
    let base = spawn_backend(Arc::new(store)).await;
    let api = HttpUsersApi::new(&base).unwrap();

    let err = api.list_users().await.unwrap_err();

    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("Database error"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn truncated_error_body_is_reported_in_detail() {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    // Answer with a 500 that promises more body than it sends.
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\npartial")
            .await
            .unwrap();
        socket.shutdown().await.ok();
    });

    let base = Url::parse(&format!("http://{addr}")).unwrap();
    let err = HttpUsersApi::new(&base).unwrap().list_users().await.unwrap_err();

    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.starts_with("<unreadable body: "), "{body}");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_backend_shows_error_on_board() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let base = Url::parse(&format!("http://{addr}")).unwrap();
    let mut board = UserBoard::new(HttpUsersApi::new(&base).unwrap());
    board.mount().await;

    assert!(board.error().is_some_and(|e| e.starts_with("Error: ")));
    assert!(!board.is_loading());
}

/// Get a database config from environment.
fn pg_config() -> Option<Config> {
    dotenvy::dotenv().ok();
    std::env::var("DB_HOST").ok()?;
    Config::load().ok()
}

#[tokio::test]
#[ignore = "requires a reachable PostgreSQL with a users table"]
async fn postgres_create_then_list() {
    let config = match pg_config() {
        Some(c) => c,
        None => {
            println!("Skipping: DB_HOST not set");
            return;
        }
    };

    let manager = Arc::new(ConnectionManager::new(
        config.connect_options(),
        config.retry_delay(),
    ));
    manager.connect_with_retry().await;
    assert_eq!(manager.state(), ConnectionState::Connected);

    let store = PgUserStore::new(Arc::clone(&manager));
    let created = store
        .create_user(NewUser::new("Ada", "ada@example.com"))
        .await
        .unwrap();
    assert_eq!(created["name"], "Ada");
    assert!(created["id"].is_number());

    let users = store.list_users().await.unwrap();
    assert!(users.len() <= 10);

    manager.close().await;
}

#[tokio::test]
#[ignore = "requires a reachable PostgreSQL with a users table"]
async fn postgres_backend_over_http() {
    let config = match pg_config() {
        Some(c) => c,
        None => {
            println!("Skipping: DB_HOST not set");
            return;
        }
    };

    let manager = Arc::new(ConnectionManager::new(
        config.connect_options(),
        config.retry_delay(),
    ));
    manager.connect_with_retry().await;

    let base = spawn_backend(Arc::new(PgUserStore::new(manager))).await;
    let api = HttpUsersApi::new(&base).unwrap();

    let created = api
        .create_user(&NewUser::new("Ada", "ada@example.com"))
        .await
        .unwrap();
    assert_eq!(created.email.as_deref(), Some("ada@example.com"));

    let users = api.list_users().await.unwrap();
    assert!(users.len() <= 10);
}
