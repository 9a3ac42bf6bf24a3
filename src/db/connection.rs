//! Single shared PostgreSQL connection with a startup retry loop.
//!
//! The manager starts out [`ConnectionState::Disconnected`] and moves to
//! [`ConnectionState::Connected`] exactly once. A connection that drops later
//! is not re-established; queries on it fail and the error reaches the caller.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use strum::{AsRefStr, Display as StrumDisplay};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::metrics;

/// Default delay between connection attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Connection status of the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    /// No connection yet; the retry loop is running.
    Disconnected,
    /// Connection established.
    Connected,
}

/// Call `connect` until it succeeds, sleeping `delay` after every failure.
///
/// There is no attempt limit and the delay never grows. `attempts` is bumped
/// before each try so observers see the live count.
pub async fn retry_forever<T, E, F, Fut>(mut connect: F, delay: Duration, attempts: &AtomicU64) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    loop {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::inc_db_connect_attempts();

        match connect().await {
            Ok(value) => return value,
            Err(e) => {
                metrics::inc_db_connect_failures();
                warn!(
                    attempt = attempt,
                    error = %e,
                    retry_in_ms = delay.as_millis() as u64,
                    "Database connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Owns the one database connection used by every request.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Connection target.
    options: PgConnectOptions,
    /// Fixed delay between attempts.
    retry_delay: Duration,
    /// The live connection, `None` until the first success.
    connection: Mutex<Option<PgConnection>>,
    /// Set once the connection is stored.
    connected: AtomicBool,
    /// Connection attempts made so far.
    attempts: AtomicU64,
}

impl ConnectionManager {
    /// Create a disconnected manager.
    pub fn new(options: PgConnectOptions, retry_delay: Duration) -> Self {
        Self {
            options,
            retry_delay,
            connection: Mutex::new(None),
            connected: AtomicBool::new(false),
            attempts: AtomicU64::new(0),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        if self.connected.load(Ordering::SeqCst) {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Number of connection attempts made so far.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Connect, retrying forever until the database accepts the connection.
    pub async fn connect_with_retry(&self) {
        if self.state() == ConnectionState::Connected {
            debug!("Database already connected");
            return;
        }

        let options = &self.options;
        let connection = retry_forever(
            || PgConnection::connect_with(options),
            self.retry_delay,
            &self.attempts,
        )
        .await;

        *self.connection.lock().await = Some(connection);
        self.connected.store(true, Ordering::SeqCst);

        info!(attempts = self.attempts(), "Connected to PostgreSQL");
    }

    /// Run the retry loop in the background.
    pub fn spawn_connect(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move { manager.connect_with_retry().await })
    }

    /// Exclusive access to the live connection for one query.
    pub async fn acquire(&self) -> Result<MappedMutexGuard<'_, PgConnection>, StoreError> {
        let guard = self.connection.lock().await;
        MutexGuard::try_map(guard, |slot| slot.as_mut()).map_err(|_| StoreError::NotConnected)
    }

    /// Close the connection at shutdown.
    pub async fn close(&self) {
        let connection = self.connection.lock().await.take();
        if let Some(connection) = connection {
            match connection.close().await {
                Ok(()) => info!("Database connection closed"),
                Err(e) => warn!(error = %e, "Failed to close database connection cleanly"),
            }
        }
    }
}
