//! Hosted pipeline adapters.
//!
//! Thin pass-through wrappers around the Hugging Face Inference API for the
//! text-classification and summarization tasks.

/// Text-classification (sentiment) pipeline.
pub mod classification;
/// Shared inference endpoint client.
pub mod client;
/// Summarization pipeline.
pub mod summarization;

pub use classification::{Classification, TextClassificationPipeline};
pub use client::{InferenceClient, InferenceError};
pub use summarization::{SummarizationPipeline, SummarizeOptions, Summary};
