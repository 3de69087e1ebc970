use std::env;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::http::{Auth, HttpFailure, RetryConfig, post_json_with_retry};

pub const HF_TOKEN_ENV: &str = "HF_TOKEN";

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference call for '{model}' failed: {source}")]
    Http { model: String, source: HttpFailure },
    #[error("inference reply for '{model}' could not be decoded: {source}")]
    Decode {
        model: String,
        source: reqwest::Error,
    },
    #[error("inference reply for '{model}' contained no results")]
    Empty { model: String },
}

/// Client for the hosted inference endpoint shared by every pipeline.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    base_url: String,
    auth: Auth,
    retry: RetryConfig,
    client: reqwest::Client,
}

impl InferenceClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth: Auth::bearer_opt(token),
            retry: RetryConfig::default(),
            client: reqwest::Client::new(),
        }
    }

    /// Creates a client that authenticates with `HF_TOKEN` when it is set.
    pub fn from_env(base_url: impl Into<String>) -> Self {
        let token = env::var(HF_TOKEN_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        if token.is_none() {
            tracing::info!("{HF_TOKEN_ENV} is not set, calling the inference API anonymously");
        }
        Self::new(base_url, token)
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn model_url(&self, model: &str) -> String {
        format!("{}/models/{model}", self.base_url.trim_end_matches('/'))
    }

    pub(crate) async fn post_model<T, R>(&self, model: &str, payload: &T) -> Result<R, InferenceError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.model_url(model);
        tracing::debug!(%url, "posting inference request");

        let response = post_json_with_retry(&self.client, &url, &self.auth, payload, self.retry)
            .await
            .map_err(|source| InferenceError::Http {
                model: model.to_string(),
                source,
            })?;

        response.json().await.map_err(|source| InferenceError::Decode {
            model: model.to_string(),
            source,
        })
    }
}
