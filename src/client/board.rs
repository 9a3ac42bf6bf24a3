//! User board: the record list and the creation form.
//!
//! The board owns the UI state and drives the backend through a
//! [`UsersApi`]. Fetch is split into [`UserBoard::begin_fetch`] and
//! [`UserBoard::finish_fetch`] so a renderer can show the loading state while
//! the request is in flight.

use std::fmt;

use tracing::{debug, warn};

use crate::error::ClientError;
use crate::users::{NewUser, User};

use super::api::UsersApi;

/// Shown when a submission has an empty field.
pub const VALIDATION_MESSAGE: &str = "Please fill in all fields";
/// Shown while a list request is in flight.
pub const LOADING_MESSAGE: &str = "Loading...";
/// Shown when the list is empty.
pub const EMPTY_MESSAGE: &str = "No users";

/// What the list area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View<'a> {
    /// A list request is in flight.
    Loading,
    /// No records to show.
    Empty,
    /// Records to show.
    Users(&'a [User]),
}

/// Result of a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blocked by the empty-field guard; nothing was sent.
    Rejected,
    /// The create request failed.
    Failed,
    /// The record was created and the list refreshed.
    Created(User),
}

/// Board state and behavior.
#[derive(Debug)]
pub struct UserBoard<A> {
    api: A,
    users: Vec<User>,
    name: String,
    email: String,
    loading: bool,
    error: Option<String>,
}

impl<A: UsersApi> UserBoard<A> {
    /// Create an unmounted board.
    pub fn new(api: A) -> Self {
        Self {
            api,
            users: Vec::new(),
            name: String::new(),
            email: String::new(),
            loading: false,
            error: None,
        }
    }

    /// The backend client.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Records currently displayed.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Name input.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Email input.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Whether a list request is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Displayed error message.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Update the name input.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Update the email input.
    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    /// Initial load.
    pub async fn mount(&mut self) {
        self.fetch_users().await;
    }

    /// Fetch the list from the backend.
    pub async fn fetch_users(&mut self) {
        self.begin_fetch();
        let result = self.api.list_users().await;
        self.finish_fetch(result);
    }

    /// Mark a list request as in flight.
    pub fn begin_fetch(&mut self) {
        self.loading = true;
    }

    /// Apply the outcome of a list request.
    ///
    /// On failure the displayed records stay as they were.
    pub fn finish_fetch(&mut self, result: Result<Vec<User>, ClientError>) {
        match result {
            Ok(users) => {
                debug!(count = users.len(), "List refreshed");
                self.users = users;
                self.error = None;
            }
            Err(e) => {
                warn!(error = %e, "List fetch failed");
                self.error = Some(error_message(&e));
            }
        }
        self.loading = false;
    }

    /// Submit the form.
    ///
    /// Empty fields block the request. On success the inputs are cleared and
    /// the list is fetched again after the create has completed.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.name.is_empty() || self.email.is_empty() {
            self.error = Some(VALIDATION_MESSAGE.to_string());
            return SubmitOutcome::Rejected;
        }

        let new_user = NewUser::new(self.name.clone(), self.email.clone());
        match self.api.create_user(&new_user).await {
            Ok(user) => {
                self.name.clear();
                self.email.clear();
                self.fetch_users().await;
                SubmitOutcome::Created(user)
            }
            Err(e) => {
                warn!(error = %e, "Create failed");
                self.error = Some(error_message(&e));
                SubmitOutcome::Failed
            }
        }
    }
}

impl<A> UserBoard<A> {
    /// What the list area shows.
    pub fn view(&self) -> View<'_> {
        if self.loading {
            View::Loading
        } else if self.users.is_empty() {
            View::Empty
        } else {
            View::Users(&self.users)
        }
    }

    /// Render the board as text.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl<A> fmt::Display for UserBoard<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "User board")?;
        if let Some(error) = &self.error {
            writeln!(f, "! {error}")?;
        }
        writeln!(f, "Name: [{}]  Email: [{}]", self.name, self.email)?;
        writeln!(f)?;
        writeln!(f, "Users")?;
        match self.view() {
            View::Loading => writeln!(f, "{LOADING_MESSAGE}")?,
            View::Empty => writeln!(f, "{EMPTY_MESSAGE}")?,
            View::Users(users) => {
                for user in users {
                    writeln!(f, "- {} - {}", user.display_name(), user.display_email())?;
                }
            }
        }
        Ok(())
    }
}

fn error_message(error: &ClientError) -> String {
    format!("Error: {error}")
}

/// A line of input typed into the interactive board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCommand {
    /// Set the name input.
    Name(String),
    /// Set the email input.
    Email(String),
    /// Submit the form.
    Submit,
    /// Fetch the list again.
    Refresh,
    /// Leave the board.
    Quit,
    /// Show the command list.
    Help,
}

impl BoardCommand {
    /// Parse one input line. Unknown or empty input yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "name" => Some(Self::Name(rest.to_string())),
            "email" => Some(Self::Email(rest.to_string())),
            "submit" | "add" => Some(Self::Submit),
            "refresh" | "r" => Some(Self::Refresh),
            "quit" | "q" | "exit" => Some(Self::Quit),
            "help" | "?" => Some(Self::Help),
            _ => None,
        }
    }

    /// Usage text for the interactive board.
    pub fn usage() -> &'static str {
        "commands: name <value> | email <value> | submit | refresh | help | quit"
    }
}
