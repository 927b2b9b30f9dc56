use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use github_client::{Error, GitHubUser, UserDirectory};

/// In-memory [`UserDirectory`] that records every call.
pub struct MockDirectory {
    users: HashMap<String, GitHubUser>,
    following: Mutex<HashSet<String>>,
    failing_operations: HashMap<String, Error>,
    failing_once: Mutex<HashMap<String, Error>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            following: Mutex::new(HashSet::new()),
            failing_operations: HashMap::new(),
            failing_once: Mutex::new(HashMap::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_user(mut self, login: &str) -> Self {
        self.users.insert(
            login.to_string(),
            GitHubUser {
                login: login.to_string(),
                name: Some(format!("{login} name")),
                ..Default::default()
            },
        );
        self
    }

    pub fn following(self, login: &str) -> Self {
        self.following.lock().unwrap().insert(login.to_string());
        self
    }

    /// Makes `operation` (for example `"follow"`) fail with `error`.
    pub fn with_failure(mut self, operation: &str, error: Error) -> Self {
        self.failing_operations.insert(operation.to_string(), error);
        self
    }

    /// Makes the next call of `operation` fail with `error`; later calls
    /// succeed.
    pub fn failing_once(self, operation: &str, error: Error) -> Self {
        self.failing_once
            .lock()
            .unwrap()
            .insert(operation.to_string(), error);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn is_following(&self, login: &str) -> bool {
        self.following.lock().unwrap().contains(login)
    }

    fn record(&self, operation: &str, subject: &str) -> Result<(), Error> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{operation}:{subject}"));

        if let Some(error) = self.failing_once.lock().unwrap().remove(operation) {
            return Err(error);
        }

        match self.failing_operations.get(operation) {
            Some(error) => Err(clone_error(error)),
            None => Ok(()),
        }
    }
}

fn clone_error(error: &Error) -> Error {
    match error {
        Error::Api { status, message } => Error::Api {
            status: *status,
            message: message.clone(),
        },
        Error::AuthError(m) => Error::AuthError(m.clone()),
        Error::InvalidRequest(m) => Error::InvalidRequest(m.clone()),
        Error::NotFound(m) => Error::NotFound(m.clone()),
        Error::Network(m) => Error::Network(m.clone()),
        other => Error::Network(other.to_string()),
    }
}

#[async_trait]
impl UserDirectory for MockDirectory {
    async fn fetch_profile(&self, username: &str) -> Result<GitHubUser, Error> {
        self.record("profile", username)?;
        self.users
            .get(username)
            .cloned()
            .ok_or_else(|| Error::NotFound(username.to_string()))
    }

    async fn search_users(&self, query: &str) -> Result<Vec<GitHubUser>, Error> {
        self.record("search", query)?;
        let mut matches: Vec<GitHubUser> = self
            .users
            .values()
            .filter(|user| user.login.contains(query))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.login.cmp(&b.login));
        matches.truncate(github_client::SEARCH_RESULT_LIMIT);
        Ok(matches)
    }

    async fn check_following(&self, username: &str) -> Result<bool, Error> {
        self.record("check", username)?;
        Ok(self.is_following(username))
    }

    async fn follow(&self, username: &str) -> Result<(), Error> {
        self.record("follow", username)?;
        self.following.lock().unwrap().insert(username.to_string());
        Ok(())
    }

    async fn unfollow(&self, username: &str) -> Result<(), Error> {
        self.record("unfollow", username)?;
        self.following.lock().unwrap().remove(username);
        Ok(())
    }
}
