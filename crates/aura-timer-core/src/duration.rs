//! Client for the external text-to-duration service.
//!
//! The service takes free text ("25 minutes for the standup") and answers
//! with a whole number of seconds. Anything that is not a positive number
//! means the text was not understood.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DurationServiceConfig;
use crate::error::DurationServiceError;

/// What the service made of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationAnswer {
    Seconds(u32),
    NotUnderstood,
}

impl DurationAnswer {
    /// Only a strictly positive count that fits the timer is an answer.
    pub fn from_raw(seconds: Option<i64>) -> Self {
        match seconds.map(u32::try_from) {
            Some(Ok(s)) if s > 0 => DurationAnswer::Seconds(s),
            _ => DurationAnswer::NotUnderstood,
        }
    }
}

/// Anything that turns free text into a duration.
#[allow(async_fn_in_trait)]
pub trait DurationParser {
    async fn parse_duration(&self, text: &str) -> Result<DurationAnswer, DurationServiceError>;
}

#[derive(Debug, Serialize)]
struct DurationRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct DurationResponse {
    #[serde(default)]
    seconds: Option<serde_json::Value>,
}

impl DurationResponse {
    fn seconds(&self) -> Option<i64> {
        self.seconds.as_ref().and_then(serde_json::Value::as_i64)
    }
}

/// `POST {"query": text}` to the configured endpoint.
#[derive(Debug, Clone)]
pub struct HttpDurationParser {
    endpoint: String,
    http_client: Client,
}

impl HttpDurationParser {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, DurationServiceError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            http_client,
        })
    }

    pub fn from_config(config: &DurationServiceConfig) -> Result<Self, DurationServiceError> {
        Self::new(
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl DurationParser for HttpDurationParser {
    async fn parse_duration(&self, text: &str) -> Result<DurationAnswer, DurationServiceError> {
        let query = text.trim();
        if query.is_empty() {
            return Err(DurationServiceError::EmptyQuery);
        }

        let resp = self
            .http_client
            .post(&self.endpoint)
            .json(&DurationRequest { query })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), endpoint = %self.endpoint, "duration service rejected query");
            return Err(DurationServiceError::Status {
                status: status.as_u16(),
            });
        }

        let body: DurationResponse = resp.json().await?;
        let answer = DurationAnswer::from_raw(body.seconds());
        debug!(?answer, "duration service answered");
        Ok(answer)
    }
}
