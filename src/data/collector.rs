use crate::data::snapshot::TelemetrySnapshot;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a poll cycle produced no snapshot.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("resolver request failed: {0}")]
    Resolve(#[source] reqwest::Error),

    #[error("resolver document has no api_url")]
    MissingApiUrl,

    #[error("telemetry request failed: {0}")]
    Fetch(#[source] reqwest::Error),

    #[error("telemetry endpoint returned {0}")]
    Status(StatusCode),

    #[error("telemetry body is not valid JSON: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("telemetry body is not a JSON object")]
    NotAnObject,

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ResolverDocument {
    #[serde(default)]
    api_url: Option<String>,
}

/// Talks to the resolver document and the telemetry service it names.
#[derive(Debug, Clone)]
pub struct TelemetryClient {
    http: reqwest::Client,
}

impl TelemetryClient {
    pub fn new(timeout: Duration) -> Result<Self, PollError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PollError::Client)?;
        Ok(Self { http })
    }

    /// Fetch the resolver document and return the service base URL.
    pub async fn resolve(&self, resolver_url: &str) -> Result<String, PollError> {
        let document = self
            .http
            .get(resolver_url)
            .send()
            .await
            .map_err(PollError::Resolve)?
            .json::<ResolverDocument>()
            .await
            .map_err(PollError::Resolve)?;

        match document.api_url {
            Some(url) if !url.trim().is_empty() => Ok(url.trim().to_string()),
            _ => Err(PollError::MissingApiUrl),
        }
    }

    /// GET `{base}/data` and parse it as a snapshot.
    pub async fn fetch(&self, base_url: &str) -> Result<TelemetrySnapshot, PollError> {
        let url = format!("{}/data", base_url.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(PollError::Fetch)?;

        if response.status() != StatusCode::OK {
            return Err(PollError::Status(response.status()));
        }

        match response.json::<Value>().await.map_err(PollError::Decode)? {
            Value::Object(fields) => Ok(TelemetrySnapshot::new(fields)),
            _ => Err(PollError::NotAnObject),
        }
    }

    /// One full cycle: resolve, then fetch. A failed resolve never reaches
    /// the telemetry endpoint.
    pub async fn poll_once(&self, resolver_url: &str) -> Result<TelemetrySnapshot, PollError> {
        let base_url = self.resolve(resolver_url).await?;
        tracing::debug!("resolved telemetry service to {}", base_url);
        self.fetch(&base_url).await
    }
}
