use serde::{Deserialize, Serialize};

use crate::hub::client::{InferenceClient, InferenceError};

/// Generation bounds forwarded to the summarization model, in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummarizeOptions {
    pub max_length: u32,
    pub min_length: u32,
    pub do_sample: bool,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            max_length: 60,
            min_length: 20,
            do_sample: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub summary_text: String,
}

#[derive(Debug, Serialize)]
struct SummarizeRequest<'a> {
    inputs: &'a str,
    parameters: SummarizeOptions,
}

#[derive(Debug, Clone)]
pub struct SummarizationPipeline {
    client: InferenceClient,
    model: String,
}

impl SummarizationPipeline {
    pub fn new(client: InferenceClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn summarize(
        &self,
        text: &str,
        options: SummarizeOptions,
    ) -> Result<Summary, InferenceError> {
        let request = SummarizeRequest {
            inputs: text,
            parameters: options,
        };
        let summaries: Vec<Summary> = self.client.post_model(&self.model, &request).await?;

        summaries
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::Empty {
                model: self.model.clone(),
            })
    }
}
