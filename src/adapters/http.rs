use crate::domain::model::{Breach, FetchOutcome};
use crate::domain::ports::BreachSource;
use crate::utils::error::{Result, ScanError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://haveibeenpwned.com/api/v3/breachedaccount";
pub const API_KEY_HEADER: &str = "hibp-api-key";

/// Added on top of the whole seconds the service advertises.
pub const RATE_LIMIT_MARGIN_MS: u64 = 800;

#[derive(Debug, Deserialize)]
struct RateLimitBody {
    message: Option<String>,
}

/// Backoff advertised by a 429 message: first digit in seconds plus the margin.
///
/// Only the first digit counts, so "Try again in 12 seconds" yields 1800 ms.
pub fn backoff_from_message(message: &str) -> Option<Duration> {
    message
        .chars()
        .find_map(|c| c.to_digit(10))
        .map(|secs| Duration::from_millis(u64::from(secs) * 1000 + RATE_LIMIT_MARGIN_MS))
}

#[derive(Debug, Clone)]
pub struct HibpClient {
    client: Client,
    endpoint: Url,
}

impl HibpClient {
    pub fn new(endpoint: &str, user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| ScanError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(ScanError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: "URL cannot take path segments".to_string(),
            });
        }

        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
        })
    }

    /// email 以單一路徑片段附加，特殊字元會被編碼
    pub fn lookup_url(&self, email: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(email);
        }
        url
    }

    async fn classify(email: &str, response: reqwest::Response) -> FetchOutcome {
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("Unknown").to_string();

        if status == StatusCode::OK {
            return match response.json::<Vec<Breach>>().await {
                Ok(breaches) => FetchOutcome::Found(breaches),
                Err(e) => FetchOutcome::Failed {
                    status: Some(status.as_u16()),
                    reason: format!("invalid response body: {}", e),
                },
            };
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let message = match response.json::<RateLimitBody>().await {
                Ok(body) => body.message.unwrap_or_default(),
                Err(e) => {
                    tracing::debug!("{}: unreadable rate-limit body: {}", email, e);
                    String::new()
                }
            };
            return FetchOutcome::RateLimited {
                retry_after: backoff_from_message(&message),
                message,
            };
        }

        if status.is_client_error() || status.is_server_error() {
            return FetchOutcome::Failed {
                status: Some(status.as_u16()),
                reason,
            };
        }

        FetchOutcome::NotFound {
            status: status.as_u16(),
        }
    }
}

#[async_trait]
impl BreachSource for HibpClient {
    async fn fetch(&self, email: &str, api_key: &str) -> FetchOutcome {
        let url = self.lookup_url(email);
        tracing::debug!("📡 GET {}", url);

        match self
            .client
            .get(url)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
        {
            Ok(response) => {
                tracing::debug!("{}: API response status: {}", email, response.status());
                Self::classify(email, response).await
            }
            // 沒有收到任何回應（連線失敗、逾時）
            Err(e) => FetchOutcome::Failed {
                status: e.status().map(|s| s.as_u16()),
                reason: e.to_string(),
            },
        }
    }
}
