use std::future::Future;

use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::Client;
use thiserror::Error;

use crate::config::Config;
use crate::models::{ApiMessage, ProfileRecord};

/// Status and raw body of a completed GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a response (DNS, connect, TLS, timeout, ...).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Anything that can perform a single GET.
pub trait Transport: Send + Sync + 'static {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// Why a lookup produced no profile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("{0}")]
    Transport(String),

    #[error("GitHub API error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Decode(String),
}

impl From<TransportError> for FetchError {
    fn from(err: TransportError) -> Self {
        FetchError::Transport(err.0)
    }
}

/// reqwest-backed transport with the headers GitHub expects.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("rust-github-user-client"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        let request = self.client.get(url);
        async move {
            let response = request.send().await.map_err(transport_error)?;
            let status = response.status().as_u16();
            let body = response.bytes().await.map_err(transport_error)?;
            Ok(HttpResponse {
                status,
                body: body.to_vec(),
            })
        }
    }
}

/// reqwest's top-level message is generic; the cause chain says what went wrong.
fn transport_error(err: reqwest::Error) -> TransportError {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    TransportError(message)
}

/// Looks up user profiles through a [`Transport`].
#[derive(Debug)]
pub struct Fetcher<T> {
    transport: T,
    api_url: String,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, api_url: impl Into<String>) -> Self {
        Self {
            transport,
            api_url: api_url.into(),
        }
    }

    /// `{api_url}/users/{username}` with the username escaped as one path segment.
    pub fn profile_url(&self, username: &str) -> String {
        format!("{}/users/{}", self.api_url, urlencoding::encode(username))
    }

    /// Fetches a user by username. Makes exactly one request, never retries.
    pub async fn fetch(&self, username: &str) -> Result<ProfileRecord, FetchError> {
        if username.trim().is_empty() {
            return Err(FetchError::EmptyUsername);
        }

        let url = self.profile_url(username);
        info!("fetching profile: {url}");

        let response = self.transport.get(&url).await?;
        debug!("{url} answered {} ({} bytes)", response.status, response.body.len());

        if !response.is_success() {
            return Err(FetchError::Status {
                status: response.status,
                message: api_message(&response.body),
            });
        }

        ProfileRecord::from_json(&response.body)
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

fn api_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ApiMessage>(body) {
        Ok(api) => api.message,
        Err(_) => String::from_utf8_lossy(body).trim().to_string(),
    }
}
