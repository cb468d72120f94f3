use std::time::Duration;

use bytes::Bytes;
use cvmatch_core::{FileHandle, FilePart, HttpMethod, OutboundRequest, RemoteError};
use cvmatch_logging::cvm_debug;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// `None` leaves the whole-request timeout to reqwest's default (unbounded).
    pub request_timeout: Option<Duration>,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid service url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("http client setup failed: {0}")]
    Client(String),
}

/// Sends one planned request and returns the raw body of a success response.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &OutboundRequest) -> Result<Bytes, RemoteError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: Url,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, TransportError> {
        let base_url =
            Url::parse(&settings.base_url).map_err(|err| TransportError::InvalidBaseUrl {
                url: settings.base_url.clone(),
                reason: err.to_string(),
            })?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidBaseUrl {
                url: settings.base_url,
                reason: "url cannot be a base".to_string(),
            });
        }

        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| TransportError::Client(err.to_string()))?;

        Ok(Self { base_url, client })
    }

    fn endpoint(&self, segments: &[String]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn build_form(&self, request: &OutboundRequest) -> Result<Form, RemoteError> {
        let mut form = Form::new();
        for (name, value) in &request.fields {
            form = form.text(*name, value.clone());
        }
        for part in &request.files {
            form = form.part(part.field, file_part(part).await?);
        }
        Ok(form)
    }
}

async fn file_part(part: &FilePart) -> Result<Part, RemoteError> {
    let name = part.entry.name().to_string();
    let content = match part.entry.handle() {
        FileHandle::Memory(bytes) => bytes.to_vec(),
        FileHandle::Path(path) => tokio::fs::read(path).await.map_err(|err| RemoteError {
            status: None,
            detail: Some(format!("Could not read {name}: {err}")),
            cause: err.to_string(),
        })?,
    };
    Ok(Part::bytes(content).file_name(name))
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<Bytes, RemoteError> {
        let url = self.endpoint(&request.path);
        let builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self
                .client
                .post(url)
                .multipart(self.build_form(request).await?),
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        cvm_debug!(
            "{} -> {} ({} bytes)",
            request.describe(),
            status.as_u16(),
            body.len()
        );

        if !status.is_success() {
            return Err(RemoteError::status(status.as_u16(), error_detail(&body)));
        }
        Ok(body)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Pulls `detail` out of a JSON error body; non-string details are rendered as JSON.
pub(crate) fn error_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.detail? {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        return RemoteError::network(format!("timeout: {err}"));
    }
    RemoteError::network(err.to_string())
}
