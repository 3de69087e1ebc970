use crate::gemini::types::{FunctionCall, GenerateContentResponse};

/// Decoded reasoning-service reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    FunctionCall(FunctionCall),
}

impl Reply {
    /// Decodes a reply without assuming any candidate or part exists.
    ///
    /// Only the first candidate is inspected. Its first function-call part
    /// wins; otherwise every text part is concatenated. A reply with nothing
    /// usable decodes to empty text.
    pub fn from_response(response: &GenerateContentResponse) -> Self {
        let Some(content) = response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
        else {
            tracing::warn!("reply contained no candidate content");
            return Self::Text(String::new());
        };

        if let Some(call) = content
            .parts
            .iter()
            .find_map(|part| part.function_call.as_ref())
        {
            return Self::FunctionCall(call.clone());
        }

        let text = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect::<String>();
        Self::Text(text)
    }

    /// Text to show the user. Function calls carry none.
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::FunctionCall(_) => "",
        }
    }
}
