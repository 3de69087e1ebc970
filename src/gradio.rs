//! Minimal client for calling a Gradio app endpoint.
//!
//! A call is two requests: `POST /gradio_api/call/{api_name}` queues the job
//! and returns an event id, then `GET /gradio_api/call/{api_name}/{event_id}`
//! streams server-sent events until a `complete` or `error` event arrives.

use std::env;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::http::Auth;
use crate::hub::client::HF_TOKEN_ENV;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("request to tool server failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("tool server error {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("tool server did not return an event id")]
    MissingEventId,
    #[error("tool server reported an error: {0}")]
    Event(String),
    #[error("tool server stream ended without a result")]
    NoResult,
    #[error("tool server returned a non-integer result: {0}")]
    NotAnInteger(Value),
    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Deserialize)]
struct QueuedCall {
    event_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GradioClient {
    src: String,
    auth: Auth,
    client: reqwest::Client,
}

impl GradioClient {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            auth: Auth::None,
            client: reqwest::Client::new(),
        }
    }

    /// Uses `HF_TOKEN` for private Spaces when it is set.
    pub fn from_env(src: impl Into<String>) -> Self {
        let token = env::var(HF_TOKEN_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Self::new(src).with_token(token)
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.auth = Auth::bearer_opt(token);
        self
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    fn call_url(&self, api_name: &str) -> String {
        format!(
            "{}/gradio_api/call/{}",
            self.src.trim_end_matches('/'),
            api_name.trim_start_matches('/')
        )
    }

    /// Runs one prediction and returns the first output value.
    pub async fn predict(&self, api_name: &str, data: Vec<Value>) -> Result<Value, ToolError> {
        let url = self.call_url(api_name);
        tracing::debug!(%url, "queueing gradio call");

        let response = self
            .auth
            .apply(self.client.post(&url))
            .json(&json!({ "data": data }))
            .send()
            .await?;
        let response = check_status(response).await?;
        let queued: QueuedCall = response.json().await?;
        let event_id = queued
            .event_id
            .filter(|id| !id.is_empty())
            .ok_or(ToolError::MissingEventId)?;

        let response = self
            .auth
            .apply(self.client.get(format!("{url}/{event_id}")))
            .send()
            .await?;
        let body = check_status(response).await?.text().await?;
        parse_event_stream(&body)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ToolError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ToolError::Api { status, body })
}

/// Extracts the first output of the `complete` event.
fn parse_event_stream(body: &str) -> Result<Value, ToolError> {
    let mut event = "";
    for line in body.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(name) = line.strip_prefix("event:") {
            event = name.trim();
            continue;
        }
        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();
        match event {
            "complete" => {
                let outputs: Value = serde_json::from_str(data)
                    .map_err(|err| ToolError::Event(format!("malformed result payload: {err}")))?;
                return match outputs {
                    Value::Array(mut values) if !values.is_empty() => Ok(values.swap_remove(0)),
                    Value::Array(_) => Err(ToolError::NoResult),
                    other => Ok(other),
                };
            }
            "error" => {
                let message = match serde_json::from_str::<Value>(data) {
                    Ok(Value::String(message)) => message,
                    Ok(Value::Null) => "unknown error".to_string(),
                    _ if data.is_empty() => "unknown error".to_string(),
                    _ => data.to_string(),
                };
                return Err(ToolError::Event(message));
            }
            _ => {}
        }
    }
    Err(ToolError::NoResult)
}

/// Coerces a returned value to an integer count.
///
/// Integral numbers pass through, floats truncate toward zero, and strings
/// are parsed after trimming. Anything else is rejected.
pub fn coerce_int(value: &Value) -> Result<i64, ToolError> {
    let parsed = match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(raw) => raw.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ToolError::NotAnInteger(value.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn complete_event_yields_first_output() {
        let body = "event: generating\ndata: null\n\nevent: complete\ndata: [3]\n\n";
        assert_eq!(parse_event_stream(body).unwrap(), json!(3));
    }

    #[test]
    fn crlf_streams_are_accepted() {
        let body = "event: complete\r\ndata: [\"7\"]\r\n\r\n";
        assert_eq!(parse_event_stream(body).unwrap(), json!("7"));
    }

    #[test]
    fn error_event_is_a_failure() {
        let body = "event: error\ndata: null\n\n";
        let err = parse_event_stream(body).unwrap_err();
        assert_eq!(err.to_string(), "tool server reported an error: unknown error");

        let body = "event: error\ndata: \"letter must be one character\"\n\n";
        let err = parse_event_stream(body).unwrap_err();
        assert!(err.to_string().contains("letter must be one character"));
    }

    #[test]
    fn heartbeat_only_stream_has_no_result() {
        let body = "event: heartbeat\ndata: null\n\n";
        assert!(matches!(parse_event_stream(body), Err(ToolError::NoResult)));
        assert!(matches!(
            parse_event_stream("event: complete\ndata: []\n"),
            Err(ToolError::NoResult)
        ));
    }

    #[test]
    fn coerce_int_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_int(&json!(3)).unwrap(), 3);
        assert_eq!(coerce_int(&json!(3.9)).unwrap(), 3);
        assert_eq!(coerce_int(&json!(" 12 ")).unwrap(), 12);
        assert_eq!(coerce_int(&json!("-1")).unwrap(), -1);
    }

    #[test]
    fn coerce_int_rejects_everything_else() {
        for value in [json!("three"), json!("3.0"), json!(null), json!([3]), json!({"n": 3})] {
            assert!(matches!(coerce_int(&value), Err(ToolError::NotAnInteger(_))), "{value}");
        }
    }

    #[tokio::test]
    async fn predict_runs_queue_then_stream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gradio_api/call/predict"))
            .and(body_json(json!({"data": ["strawberry", "r"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"event_id": "abc"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gradio_api/call/predict/abc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string("event: complete\ndata: [3]\n\n"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = GradioClient::new(format!("{}/", server.uri()));
        let value = client
            .predict("/predict", vec![json!("strawberry"), json!("r")])
            .await
            .unwrap();
        assert_eq!(value, json!(3));
    }

    #[tokio::test]
    async fn predict_reports_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;

        let err = GradioClient::new(server.uri())
            .predict("predict", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Api { status, .. } if status == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn predict_requires_event_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let err = GradioClient::new(server.uri())
            .predict("predict", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::MissingEventId));
    }
}
