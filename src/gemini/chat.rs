use std::env;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::config::DEFAULT_GEMINI_BASE_URL;
use crate::gemini::reply::Reply;
use crate::gemini::types::{Content, GenerateContentRequest, GenerateContentResponse, ROLE_MODEL};
use crate::http::{Auth, HttpFailure, RetryConfig, post_json_with_retry};
use crate::relay::ReasoningService;
use crate::tools::Tool;

pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("{} is not set in the environment", GOOGLE_API_KEY_ENV)]
    MissingApiKey,
    #[error("gemini {0}")]
    Http(#[from] HttpFailure),
    #[error("gemini reply could not be decoded: {0}")]
    Decode(reqwest::Error),
}

/// `generateContent` client bound to one model and its tool declarations.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    model: String,
    base_url: String,
    auth: Auth,
    tools: Vec<Tool>,
    retry: RetryConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            auth: Auth::Header(API_KEY_HEADER, api_key.into()),
            tools: Vec::new(),
            retry: RetryConfig::default(),
            client: reqwest::Client::new(),
        }
    }

    /// Creates a client from the `GOOGLE_API_KEY` env var.
    pub fn from_env(model: impl Into<String>) -> Result<Self, GeminiError> {
        let api_key = env::var(GOOGLE_API_KEY_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or(GeminiError::MissingApiKey)?;
        Ok(Self::new(api_key.trim(), model))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Returns a cloned client bound to tool declarations.
    pub fn bind_tools(&self, tools: Vec<Tool>) -> Self {
        let mut bound = self.clone();
        bound.tools = tools;
        bound
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    pub async fn generate(
        &self,
        contents: &[Content],
    ) -> Result<GenerateContentResponse, GeminiError> {
        let request = GenerateContentRequest {
            contents,
            tools: self.tools.iter().map(Tool::to_json).collect(),
        };

        let url = self.endpoint();
        tracing::debug!(model = %self.model, turns = contents.len(), "sending generateContent");
        let response = post_json_with_retry(&self.client, &url, &self.auth, &request, self.retry).await?;
        let body: GenerateContentResponse = response.json().await.map_err(GeminiError::Decode)?;

        if let Some(usage) = &body.usage_metadata {
            tracing::debug!(
                prompt = ?usage.prompt_token_count,
                candidates = ?usage.candidates_token_count,
                total = ?usage.total_token_count,
                "gemini usage"
            );
        }
        Ok(body)
    }

    pub fn start_chat(&self) -> ChatSession {
        ChatSession {
            client: self.clone(),
            history: Vec::new(),
        }
    }
}

/// Multi-turn chat that replays its history on every request.
#[derive(Debug, Clone)]
pub struct ChatSession {
    client: GeminiClient,
    history: Vec<Content>,
}

impl ChatSession {
    pub fn history(&self) -> &[Content] {
        &self.history
    }

    /// Sends one content. The history only grows when the model answered.
    pub async fn send_message(&mut self, content: Content) -> Result<Reply, GeminiError> {
        self.history.push(content);

        let response = match self.client.generate(&self.history).await {
            Ok(response) => response,
            Err(err) => {
                self.history.pop();
                return Err(err);
            }
        };

        let reply = Reply::from_response(&response);
        match response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .filter(|content| !content.parts.is_empty())
        {
            Some(mut content) => {
                content.role.get_or_insert_with(|| ROLE_MODEL.to_string());
                self.history.push(content);
            }
            None => {
                self.history.pop();
            }
        }
        Ok(reply)
    }

    /// Drops a trailing model function call that will not be answered.
    pub fn pop_pending_call(&mut self) -> bool {
        let pending = self.history.last().is_some_and(|content| {
            content.role.as_deref() == Some(ROLE_MODEL)
                && content.parts.iter().any(|part| part.function_call.is_some())
        });
        if pending {
            self.history.pop();
        }
        pending
    }
}

#[async_trait]
impl ReasoningService for ChatSession {
    async fn send_text(&mut self, text: &str) -> Result<Reply, GeminiError> {
        self.send_message(Content::user_text(text)).await
    }

    async fn send_function_response(
        &mut self,
        name: &str,
        response: Value,
    ) -> Result<Reply, GeminiError> {
        self.send_message(Content::function_response(name, response)).await
    }

    fn discard_pending_call(&mut self) {
        if self.pop_pending_call() {
            tracing::debug!("dropped an unanswered function call from the history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "gemini-test";

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new("key-1", MODEL).with_base_url(server.uri())
    }

    fn text_reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
        }))
    }

    #[test]
    fn endpoint_includes_model() {
        let client = GeminiClient::new("k", "gemini-1.5-flash-latest").with_base_url("https://g.test/");
        assert_eq!(
            client.endpoint(),
            "https://g.test/v1beta/models/gemini-1.5-flash-latest:generateContent"
        );
    }

    #[tokio::test]
    async fn sends_key_and_tool_declarations() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:generateContent"))
            .and(header("x-goog-api-key", "key-1"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
                "tools": [{"functionDeclarations": [{"name": "noop"}]}]
            })))
            .respond_with(text_reply("hi"))
            .expect(1)
            .mount(&server)
            .await;

        let tools = vec![Tool::from_functions(vec![crate::tools::ToolFunction::new("noop", "Does nothing.")])];
        let mut chat = client(&server).bind_tools(tools).start_chat();
        let reply = chat.send_text("hello").await.unwrap();
        assert_eq!(reply, Reply::Text("hi".to_string()));
    }

    #[tokio::test]
    async fn history_accumulates_user_and_model_turns() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(text_reply("ok"))
            .mount(&server)
            .await;

        let mut chat = client(&server).start_chat();
        chat.send_text("one").await.unwrap();
        chat.send_text("two").await.unwrap();

        let roles: Vec<_> = chat
            .history()
            .iter()
            .map(|content| content.role.as_deref().unwrap_or(""))
            .collect();
        assert_eq!(roles, ["user", "model", "user", "model"]);
    }

    #[tokio::test]
    async fn failed_request_leaves_history_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let mut chat = client(&server).start_chat();
        let err = chat.send_text("hello").await.unwrap_err();
        assert!(err.to_string().contains("API key not valid"));
        assert!(chat.history().is_empty());
    }

    #[tokio::test]
    async fn empty_candidates_do_not_pollute_history() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let mut chat = client(&server).start_chat();
        let reply = chat.send_text("hello").await.unwrap();
        assert_eq!(reply.text(), "");
        assert!(chat.history().is_empty());
    }

    #[tokio::test]
    async fn blocked_reply_without_parts_is_not_replayed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"role": "model", "parts": []}, "finishReason": "SAFETY"}]
            })))
            .mount(&server)
            .await;

        let mut chat = client(&server).start_chat();
        let reply = chat.send_text("hello").await.unwrap();
        assert_eq!(reply, Reply::Text(String::new()));
        assert!(chat.history().is_empty());
    }

    #[tokio::test]
    async fn discarded_call_is_not_replayed_on_the_next_turn() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"role": "model", "parts": [
                    {"functionCall": {"name": "noop", "args": {}}}
                ]}}]
            })))
            .mount(&server)
            .await;

        let mut chat = client(&server).start_chat();
        chat.send_text("count").await.unwrap();
        chat.send_function_response("noop", json!({"result": 1}))
            .await
            .unwrap();
        assert!(chat.pop_pending_call());
        assert!(!chat.pop_pending_call());
        chat.send_text("next question").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: Value = requests[2].body_json().unwrap();
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 4);
        assert!(contents[1]["parts"][0].get("functionCall").is_some());
        assert!(contents[2]["parts"][0].get("functionResponse").is_some());
        assert_eq!(contents[3], json!({"role": "user", "parts": [{"text": "next question"}]}));
    }
}
