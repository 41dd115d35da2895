//! Clients for the two collaborators the engine consults: a cost estimator
//! for a location and an advice writer. Neither can fail from the caller's
//! point of view; any error is logged and replaced with a fixed fallback.

mod advice;
mod location;

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use advice::{AdviceRequest, FALLBACK_ADVICE};
pub use location::FALLBACK_LOCATION_COSTS;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub cost_estimate_url: Option<String>,
    pub advice_url: Option<String>,
    pub timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cost_estimate_url: None,
            advice_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} endpoint is not configured")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid response value: {0}")]
    InvalidValue(String),
}

/// A collaborator result, flagged when the fallback had to stand in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate<T> {
    pub value: T,
    pub used_fallback: bool,
}

impl<T> Estimate<T> {
    fn fetched(value: T) -> Self {
        Self {
            value,
            used_fallback: false,
        }
    }

    fn fallback(value: T) -> Self {
        Self {
            value,
            used_fallback: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Collaborators {
    client: reqwest::Client,
    config: ServiceConfig,
}

impl Collaborators {
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Collaborators with no endpoints: every call returns its fallback.
    pub fn offline() -> Result<Self, ServiceError> {
        Self::new(ServiceConfig::default())
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, ServiceError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status));
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
