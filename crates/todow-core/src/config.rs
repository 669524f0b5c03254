//! Shared configuration values
//!
//! Constants both the server and the client agree on, and the credential
//! pair guarding the HTTP API.

use serde::{Deserialize, Serialize};

/// Default HTTP Basic username
pub const DEFAULT_USER: &str = "todow";

/// Default HTTP Basic password
pub const DEFAULT_PASSWORD: &str = "todow";

/// Path prefix of the JSON API
pub const API_PATH: &str = "/api/";

/// Key-value namespace holding the collection
pub const BUCKET_NAME: &str = "todow";

/// Key of the collection document inside [`BUCKET_NAME`]
pub const COLLECTION_KEY: &str = "items";

/// Static username/password pair for HTTP Basic authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Check a presented username/password against this pair
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_USER, DEFAULT_PASSWORD)
    }
}
