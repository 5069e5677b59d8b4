//! Request transport: the only place that touches the network.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::ApiError;
use crate::config::Settings;

const PDF_MIME: &str = "application/pdf";

/// HTTP method used by the service API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A file sent as the multipart `file` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// A shaped request, independent of the HTTP library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the base URL, already percent-encoded.
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Multipart upload; `None` means a JSON request.
    pub upload: Option<Upload>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            upload: None,
        }
    }

    pub fn post_file(path: impl Into<String>, upload: Upload) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            upload: Some(upload),
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Resolve against the service base URL.
    pub fn url(&self, base: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{}", base, self.path)).map_err(|e| {
            debug!("Invalid service URL {}{}: {}", base, self.path, e);
            ApiError::Network {
                status: None,
                message: None,
            }
        })?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &self.query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }
}

/// Status and body of a completed exchange, success or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends shaped requests. Implementations report transport-level failures
/// only; HTTP error statuses come back as a `RawResponse`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError>;
}

/// Transport backed by `reqwest`.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport from settings.
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let timeout = settings.timeout();
        let client = Client::builder()
            .user_agent(&settings.user_agent)
            // Total deadline per request, not an idle timer.
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| {
                debug!("Failed to create HTTP client: {}", e);
                ApiError::Network {
                    status: None,
                    message: None,
                }
            })?;

        Ok(Self {
            client,
            base_url: settings.api_base_url.clone(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn classify(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                after: self.timeout,
            }
        } else {
            debug!("Transport error: {}", err);
            ApiError::Network {
                status: err.status().map(|s| s.as_u16()),
                message: None,
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let url = request.url(&self.base_url)?;
        let builder = match request.method {
            Method::Get => self.client.get(url.clone()),
            Method::Post => self.client.post(url.clone()),
        };

        let builder = match request.upload {
            Some(upload) => {
                let part = Part::bytes(upload.bytes)
                    .file_name(upload.file_name)
                    .mime_str(PDF_MIME)
                    .map_err(|e| self.classify(e))?;
                builder.multipart(Form::new().part("file", part))
            }
            None => builder.header(reqwest::header::ACCEPT, "application/json"),
        };

        let start = Instant::now();
        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        debug!(
            "{} {} -> {} ({} ms, {} bytes)",
            request.method.as_str(),
            url.path(),
            status,
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(RawResponse { status, body })
    }
}
