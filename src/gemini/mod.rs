//! Gemini `generateContent` client with manual function calling.

/// Client and multi-turn chat session.
pub mod chat;
/// Defensive decoding of model replies.
pub mod reply;
/// Wire types for requests and replies.
pub mod types;

pub use chat::{ChatSession, GOOGLE_API_KEY_ENV, GeminiClient, GeminiError};
pub use reply::Reply;
pub use types::{Content, FunctionCall, FunctionResponse, Part};
