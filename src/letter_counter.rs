//! The remote letter-counter tool: declaration, arguments, and RPC binding.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::gradio::{GradioClient, ToolError, coerce_int};
use crate::tools::{ToolFunction, ToolParam};

pub const TOOL_NAME: &str = "call_letter_counter_tool";

/// Result forwarded to the model when the remote call fails.
pub const FAILED_CALL: i64 = -1;

/// Declaration advertised to the reasoning service.
pub fn declaration() -> ToolFunction {
    ToolFunction::new(
        TOOL_NAME,
        "Count how many times a given letter appears in a piece of text.",
    )
    .with_param(ToolParam::required_string(
        "word",
        "The full text to search in.",
    ))
    .with_param(ToolParam::required_string(
        "letter",
        "The single character to count.",
    ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterCountArgs {
    pub word: String,
    pub letter: String,
}

impl LetterCountArgs {
    /// Pulls `word` and `letter` out of a function-call argument map.
    pub fn from_args(args: &Value) -> Result<Self, ToolError> {
        let field = |name: &str| {
            args.get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| ToolError::InvalidArguments(format!("missing string argument '{name}'")))
        };
        Ok(Self {
            word: field("word")?,
            letter: field("letter")?,
        })
    }
}

/// Anything able to answer a letter-count request.
#[async_trait]
pub trait LetterCounter: Send + Sync {
    /// Where the count is computed, for display.
    fn endpoint(&self) -> &str;

    async fn count(&self, word: &str, letter: &str) -> Result<i64, ToolError>;
}

/// Letter counter hosted as a Gradio app.
#[derive(Debug, Clone)]
pub struct RemoteLetterCounter {
    client: GradioClient,
    api_name: String,
}

impl RemoteLetterCounter {
    pub fn new(client: GradioClient, api_name: impl Into<String>) -> Self {
        Self {
            client,
            api_name: api_name.into(),
        }
    }
}

#[async_trait]
impl LetterCounter for RemoteLetterCounter {
    fn endpoint(&self) -> &str {
        self.client.src()
    }

    async fn count(&self, word: &str, letter: &str) -> Result<i64, ToolError> {
        let value = self
            .client
            .predict(&self.api_name, vec![json!(word), json!(letter)])
            .await?;
        coerce_int(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn declaration_matches_fixed_schema() {
        let declaration = declaration().to_declaration();
        assert_eq!(declaration["name"], TOOL_NAME);
        assert_eq!(declaration["parameters"]["properties"]["word"]["type"], "STRING");
        assert_eq!(declaration["parameters"]["properties"]["letter"]["type"], "STRING");
        assert_eq!(declaration["parameters"]["required"], json!(["word", "letter"]));
    }

    #[test]
    fn args_require_both_strings() {
        let args = LetterCountArgs::from_args(&json!({"word": "banana", "letter": "a"})).unwrap();
        assert_eq!(args.word, "banana");
        assert_eq!(args.letter, "a");

        let err = LetterCountArgs::from_args(&json!({"word": "banana"})).unwrap_err();
        assert!(err.to_string().contains("'letter'"));
        assert!(LetterCountArgs::from_args(&json!({"word": 3, "letter": "a"})).is_err());
        assert!(LetterCountArgs::from_args(&Value::Null).is_err());
    }

    #[tokio::test]
    async fn remote_counter_coerces_string_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gradio_api/call/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"event_id": "e1"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gradio_api/call/predict/e1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("event: complete\ndata: [\"2\"]\n\n"))
            .mount(&server)
            .await;

        let counter = RemoteLetterCounter::new(GradioClient::new(server.uri()), "predict");
        assert_eq!(counter.count("banana", "n").await.unwrap(), 2);
        assert_eq!(counter.endpoint(), server.uri());
    }
}
