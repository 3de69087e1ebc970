//! Demonstration clients for hosted NLP pipelines and a tool-calling chat relay.

/// CLI command implementations shared by every binary.
pub mod commands;
pub mod config;
pub mod error;
/// Gemini reasoning-service client.
pub mod gemini;
/// Gradio RPC client used to reach the letter-counter tool.
pub mod gradio;
pub mod http;
/// Hugging Face inference pipelines.
pub mod hub;
pub mod letter_counter;
pub mod logging;
pub mod relay;
/// Function declaration builders.
pub mod tools;

pub use error::Error;
