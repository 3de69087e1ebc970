use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub timeout_secs: Option<u64>,
    pub retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            retries: 0,
            retry_delay_ms: 500,
        }
    }
}

/// How a request authenticates against the remote service.
#[derive(Debug, Clone)]
pub enum Auth {
    None,
    Bearer(String),
    Header(&'static str, String),
}

impl Auth {
    pub fn bearer_opt(token: Option<String>) -> Self {
        match token {
            Some(token) => Self::Bearer(token),
            None => Self::None,
        }
    }

    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::None => request,
            Self::Bearer(token) => request.bearer_auth(token),
            Self::Header(name, value) => request.header(*name, value),
        }
    }
}

#[derive(Debug, Error)]
pub enum HttpFailure {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Api { status: StatusCode, body: String },
}

pub(crate) async fn post_json_with_retry<T: Serialize + ?Sized>(
    client: &reqwest::Client,
    url: &str,
    auth: &Auth,
    payload: &T,
    config: RetryConfig,
) -> Result<reqwest::Response, HttpFailure> {
    let max_attempts = config.retries.saturating_add(1);
    let mut attempt = 0;

    loop {
        let mut request = auth.apply(client.post(url)).json(payload);

        if let Some(timeout_secs) = config.timeout_secs {
            request = request.timeout(Duration::from_secs(timeout_secs));
        }

        match request.send().await {
            Ok(response) => {
                if response.status().is_success() {
                    return Ok(response);
                }

                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let can_retry = is_retryable_status(status) && attempt + 1 < max_attempts;

                if can_retry {
                    let delay = retry_delay(attempt, config.retry_delay_ms);
                    tracing::warn!(%url, %status, attempt, ?delay, "retrying after API error");
                    sleep(delay).await;
                    attempt += 1;
                    continue;
                }

                return Err(HttpFailure::Api { status, body });
            }
            Err(source) => {
                let can_retry = is_retryable_request_error(&source) && attempt + 1 < max_attempts;

                if can_retry {
                    let delay = retry_delay(attempt, config.retry_delay_ms);
                    tracing::warn!(%url, error = %source, attempt, ?delay, "retrying after request error");
                    sleep(delay).await;
                    attempt += 1;
                    continue;
                }

                return Err(HttpFailure::Request(source));
            }
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_request_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

fn retry_delay(attempt: u32, base_ms: u64) -> Duration {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    let delay_ms = base_ms.saturating_mul(factor).min(30_000);
    Duration::from_millis(delay_ms)
}
