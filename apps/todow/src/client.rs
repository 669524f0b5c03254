//! HTTP client for the todow API

use std::time::Duration;

use chrono::Utc;
use reqwest::{header::CONTENT_TYPE, Method};
use thiserror::Error;

use todow_core::{Credentials, Item, ItemId, API_PATH};

/// Default server address, without the API path
pub const DEFAULT_HOST: &str = "http://localhost:9999";

/// Overall timeout for one request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(7);

/// Where and how to reach the server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub credentials: Credentials,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            credentials: Credentials::default(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

/// Client errors
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Unable to {method} {url}: {source}")]
    Request {
        method: Method,
        url: String,
        source: reqwest::Error,
    },

    #[error("unable to decode json response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unable to build HTTP client: {0}")]
    Build(reqwest::Error),
}

/// Result of listing items
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// The server returned the collection
    Items(Vec<Item>),
    /// The server answered in plain text, usually an error message
    Message(String),
}

/// Client for one todow server
pub struct TodowClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl TodowClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self { http, config })
    }

    /// List all items
    pub async fn list(&self) -> Result<Listing, ClientError> {
        let url = self.url("");
        let response = self.send(Method::GET, &url, None).await?;

        let is_text = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("text/plain"));
        let text = read_text(Method::GET, &url, response).await?;

        if is_text {
            return Ok(Listing::Message(text));
        }
        Ok(Listing::Items(serde_json::from_str(&text)?))
    }

    /// Add an item, stamped with the local clock
    pub async fn add(&self, body: &str) -> Result<String, ClientError> {
        let item = Item::new(body, Utc::now());
        let url = self.url("");
        let response = self.send(Method::POST, &url, Some(&item)).await?;
        read_text(Method::POST, &url, response).await
    }

    /// Remove an item
    pub async fn remove(&self, id: ItemId) -> Result<String, ClientError> {
        let url = self.url(&id.to_string());
        let response = self.send(Method::DELETE, &url, None).await?;
        read_text(Method::DELETE, &url, response).await
    }

    /// Mark an item complete
    pub async fn complete(&self, id: ItemId) -> Result<String, ClientError> {
        let url = self.url(&id.to_string());
        let response = self.send(Method::PATCH, &url, None).await?;
        read_text(Method::PATCH, &url, response).await
    }

    fn url(&self, suffix: &str) -> String {
        format!(
            "{}{}{}",
            self.config.host.trim_end_matches('/'),
            API_PATH,
            suffix
        )
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        item: Option<&Item>,
    ) -> Result<reqwest::Response, ClientError> {
        tracing::debug!("{} {}", method, url);

        let credentials = &self.config.credentials;
        let mut request = self
            .http
            .request(method.clone(), url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .header(CONTENT_TYPE, "application/json");
        if let Some(item) = item {
            request = request.json(item);
        }

        request.send().await.map_err(|source| ClientError::Request {
            method,
            url: url.to_string(),
            source,
        })
    }
}

async fn read_text(
    method: Method,
    url: &str,
    response: reqwest::Response,
) -> Result<String, ClientError> {
    response.text().await.map_err(|source| ClientError::Request {
        method,
        url: url.to_string(),
        source,
    })
}
