//! Backend HTTP client.

use async_trait::async_trait;
use tracing::{debug, instrument};
use url::Url;

use crate::error::ClientError;
use crate::users::{NewUser, User};

/// Backend operations the board depends on.
#[async_trait]
pub trait UsersApi: Send + Sync {
    /// Fetch the current user list.
    async fn list_users(&self) -> Result<Vec<User>, ClientError>;

    /// Create a user and return the stored record.
    async fn create_user(&self, new_user: &NewUser) -> Result<User, ClientError>;
}

/// reqwest-backed client for the user endpoints.
#[derive(Debug, Clone)]
pub struct HttpUsersApi {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Resolved `/api/users` endpoint.
    users_url: Url,
}

impl HttpUsersApi {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &Url) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            // Keep connections alive for reuse between refreshes
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            users_url: users_endpoint(base_url)?,
        })
    }

    /// The endpoint this client talks to.
    pub fn users_url(&self) -> &Url {
        &self.users_url
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(error = %e, status = status.as_u16(), "Failed to read error body");
                format!("<unreadable body: {e}>")
            }
        };
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// Resolve `api/users` against the base, keeping any path prefix.
fn users_endpoint(base_url: &Url) -> Result<Url, ClientError> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join("api/users")?)
}

#[async_trait]
impl UsersApi for HttpUsersApi {
    #[instrument(skip(self), fields(url = %self.users_url))]
    async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        let response = self.http.get(self.users_url.clone()).send().await?;
        let users: Vec<User> = Self::check(response).await?.json().await?;
        debug!(count = users.len(), "Fetched users");
        Ok(users)
    }

    #[instrument(skip(self, new_user), fields(url = %self.users_url))]
    async fn create_user(&self, new_user: &NewUser) -> Result<User, ClientError> {
        let response = self
            .http
            .post(self.users_url.clone())
            .json(new_user)
            .send()
            .await?;
        let user: User = Self::check(response).await?.json().await?;
        debug!(id = user.id, "Created user");
        Ok(user)
    }
}
