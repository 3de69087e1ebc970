use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::gemini::GeminiError;
use crate::hub::InferenceError;
use crate::relay::RelayError;

/// Top-level error returned by every command.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Gemini(#[from] GeminiError),
    #[error(transparent)]
    Relay(#[from] RelayError),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),
}
