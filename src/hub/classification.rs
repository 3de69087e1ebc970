use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::hub::client::{InferenceClient, InferenceError};

/// Predicted label with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}

/// The endpoint answers either one list per input or a flat list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationPayload {
    Nested(Vec<Vec<Classification>>),
    Flat(Vec<Classification>),
}

#[derive(Debug, Clone)]
pub struct TextClassificationPipeline {
    client: InferenceClient,
    model: String,
}

impl TextClassificationPipeline {
    pub fn new(client: InferenceClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Classifies one text and returns the top-scoring label.
    pub async fn classify(&self, text: &str) -> Result<Classification, InferenceError> {
        let payload: ClassificationPayload = self
            .client
            .post_model(&self.model, &json!({ "inputs": text }))
            .await?;

        let candidates = match payload {
            ClassificationPayload::Nested(mut lists) if !lists.is_empty() => lists.swap_remove(0),
            ClassificationPayload::Nested(_) => Vec::new(),
            ClassificationPayload::Flat(list) => list,
        };
        top(candidates).ok_or_else(|| self.empty())
    }

    /// Classifies several texts in one request, one result per input.
    pub async fn classify_batch(
        &self,
        texts: &[String],
    ) -> Result<Vec<Classification>, InferenceError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let payload: ClassificationPayload = self
            .client
            .post_model(&self.model, &json!({ "inputs": texts }))
            .await?;

        let results = match payload {
            ClassificationPayload::Nested(lists) => {
                lists.into_iter().map(top).collect::<Option<Vec<_>>>()
            }
            // A flat reply carries the single best label of each input.
            ClassificationPayload::Flat(list) if list.len() == texts.len() => Some(list),
            ClassificationPayload::Flat(list) if texts.len() == 1 => top(list).map(|c| vec![c]),
            ClassificationPayload::Flat(_) => None,
        };

        match results {
            Some(results) if results.len() == texts.len() => Ok(results),
            _ => Err(self.empty()),
        }
    }

    fn empty(&self) -> InferenceError {
        InferenceError::Empty {
            model: self.model.clone(),
        }
    }
}

fn top(candidates: Vec<Classification>) -> Option<Classification> {
    candidates
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "distilbert/sst2";

    fn pipeline(server: &MockServer) -> TextClassificationPipeline {
        let client = InferenceClient::new(server.uri(), Some("hf-test".to_string()));
        TextClassificationPipeline::new(client, MODEL)
    }

    #[tokio::test]
    async fn classify_picks_highest_score_from_nested_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/distilbert/sst2"))
            .and(header("authorization", "Bearer hf-test"))
            .and(body_json(json!({"inputs": "I love it"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([[
                {"label": "NEGATIVE", "score": 0.0002},
                {"label": "POSITIVE", "score": 0.9998}
            ]])))
            .mount(&server)
            .await;

        let result = pipeline(&server).classify("I love it").await.unwrap();
        assert_eq!(result.label, "POSITIVE");
        assert!((result.score - 0.9998).abs() < 1e-9);
    }

    #[tokio::test]
    async fn classify_accepts_flat_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"label": "NEGATIVE", "score": 0.91}])),
            )
            .mount(&server)
            .await;

        let result = pipeline(&server).classify("meh").await.unwrap();
        assert_eq!(result.label, "NEGATIVE");
    }

    #[tokio::test]
    async fn classify_reports_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = pipeline(&server).classify("x").await.unwrap_err();
        assert!(matches!(err, InferenceError::Empty { .. }));
    }

    #[tokio::test]
    async fn classify_surfaces_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid credentials"))
            .mount(&server)
            .await;

        let err = pipeline(&server).classify("x").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("distilbert/sst2"));
        assert!(message.contains("401"));
        assert!(message.contains("Invalid credentials"));
    }

    #[tokio::test]
    async fn batch_returns_one_result_per_input() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({"inputs": ["good", "bad"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                [{"label": "POSITIVE", "score": 0.99}, {"label": "NEGATIVE", "score": 0.01}],
                [{"label": "NEGATIVE", "score": 0.97}, {"label": "POSITIVE", "score": 0.03}]
            ])))
            .mount(&server)
            .await;

        let texts = vec!["good".to_string(), "bad".to_string()];
        let results = pipeline(&server).classify_batch(&texts).await.unwrap();
        let labels: Vec<_> = results.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["POSITIVE", "NEGATIVE"]);
    }

    #[tokio::test]
    async fn empty_batch_skips_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let results = pipeline(&server).classify_batch(&[]).await.unwrap();
        assert!(results.is_empty());
    }
}
