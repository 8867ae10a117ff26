use reqwest::{Client, StatusCode};
use serde_json::Value;

use compendium_core::config::{CatalogSettings, Settings};
use compendium_core::error::{Error, Result};
use compendium_core::traits::CatalogSource;

use crate::retry::{AttemptOutcome, RetryPolicy, RetryState};

/// reqwest-backed catalog client. GET only, no auth headers.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: String,
    policy: RetryPolicy,
}

impl HttpCatalog {
    pub fn new(catalog: &CatalogSettings, policy: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(catalog.timeout())
            .build()
            .map_err(|e| Error::InvalidConfig(format!("http client: {}", e)))?;
        Ok(Self {
            client,
            base_url: catalog.base_url.trim_end_matches('/').to_string(),
            policy,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.catalog, RetryPolicy::from_settings(&settings.retry))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Absolute URLs pass through; service-rooted paths are joined to the base.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Run the retry schedule for one call. No state is shared between calls.
    pub async fn fetch_json(&self, path: &str) -> Result<Value> {
        let mut state = RetryState::start();
        let mut last_status = None;
        loop {
            match state {
                RetryState::Attempting(attempt) => {
                    let result = self.attempt(path, attempt, &mut last_status).await;
                    state = state.after_attempt(&self.policy, AttemptOutcome::of(&result));
                    if state.is_terminal() {
                        return result.map_err(|e| {
                            tracing::warn!("Giving up on {} after {} attempts: {}", path, attempt + 1, e);
                            exhausted(path, e, last_status)
                        });
                    }
                }
                RetryState::WaitingRateLimit { next, delay } => {
                    tracing::info!(
                        "Rate limited on {}, waiting {}ms before retry {}/{}",
                        path,
                        delay.as_millis(),
                        next + 1,
                        self.policy.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                    state = state.after_wait();
                }
                RetryState::WaitingBackoff { next, delay } => {
                    tracing::warn!(
                        "Request for {} failed, retrying in {}ms ({}/{})",
                        path,
                        delay.as_millis(),
                        next + 1,
                        self.policy.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                    state = state.after_wait();
                }
                RetryState::Succeeded | RetryState::Failed => {
                    unreachable!("terminal states return from the attempt arm")
                }
            }
        }
    }

    async fn attempt(&self, path: &str, attempt: u32, last_status: &mut Option<StatusCode>) -> Result<Value> {
        *last_status = None;
        let url = self.url_for(path);
        tracing::debug!("GET {} (attempt {})", url, attempt + 1);
        let response = self.client.get(&url).send().await.map_err(|e| Error::Transient {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        *last_status = Some(status);
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited { path: path.to_string(), attempts: attempt + 1 });
        }
        if status.is_server_error() {
            return Err(Error::Transient {
                path: path.to_string(),
                reason: format!("HTTP error! status: {}", status.as_u16()),
            });
        }
        if !status.is_success() {
            return Err(Error::Permanent { path: path.to_string(), status: status.as_u16() });
        }

        response.json::<Value>().await.map_err(|e| Error::Transient {
            path: path.to_string(),
            reason: format!("malformed body: {}", e),
        })
    }
}

/// A server error that survived every retry is final; network and body
/// failures stay transient.
fn exhausted(path: &str, err: Error, last_status: Option<StatusCode>) -> Error {
    match (err, last_status) {
        (Error::Transient { .. }, Some(status)) if status.is_server_error() => {
            Error::Permanent { path: path.to_string(), status: status.as_u16() }
        }
        (err, _) => err,
    }
}

impl CatalogSource for HttpCatalog {
    async fn fetch_json(&self, path: &str) -> Result<Value> {
        HttpCatalog::fetch_json(self, path).await
    }
}

