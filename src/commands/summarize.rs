use std::io::{self, Write};

use clap::Args;
use serde_json::json;

use crate::config::Config;
use crate::error::Error;
use crate::hub::{InferenceClient, SummarizationPipeline, SummarizeOptions};

pub const EXAMPLE_ARTICLE: &str = concat!(
    "Transformer models and large language models (LLMs) have revolutionized",
    " natural language processing by enabling machines to understand and",
    " generate human-like text. One of the key capabilities of these models",
    " is summarization, which condenses long passages into concise and",
    " informative summaries. The Hugging Face Transformers library provides",
    " a simple `pipeline` interface that abstracts away the complexity of",
    " loading pre-trained models and tokenizers. In this example we show",
    " how to perform summarization on a short article using the pipeline API."
);

#[derive(Debug, Args, Clone, Default)]
pub struct SummarizeArgs {
    /// Text to summarize. Defaults to a built-in example article.
    pub text: Option<String>,
    /// Model id on the inference endpoint.
    #[arg(long)]
    pub model: Option<String>,
    /// Upper bound on summary length, in tokens.
    #[arg(long)]
    pub max_length: Option<u32>,
    /// Lower bound on summary length, in tokens.
    #[arg(long)]
    pub min_length: Option<u32>,
    /// Sample instead of greedy decoding.
    #[arg(long)]
    pub sample: bool,
    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: SummarizeArgs) -> Result<(), Error> {
    let config = Config::load()?;
    let defaults = &config.summarize;
    let options = SummarizeOptions {
        max_length: args.max_length.unwrap_or(defaults.max_length),
        min_length: args.min_length.unwrap_or(defaults.min_length),
        do_sample: args.sample || defaults.do_sample,
    };
    let model = args.model.unwrap_or_else(|| defaults.model.clone());
    let client = InferenceClient::from_env(defaults.base_url.clone())
        .with_retry(config.http.retry_config());
    let pipeline = SummarizationPipeline::new(client, model);

    let article = args.text.unwrap_or_else(|| EXAMPLE_ARTICLE.to_string());
    tracing::info!(model = %pipeline.model(), ?options, "summarizing");
    let summary = pipeline.summarize(&article, options).await?;

    let mut stdout = io::stdout().lock();
    if args.json {
        let body = json!({ "text": article, "summary_text": summary.summary_text });
        writeln!(stdout, "{}", serde_json::to_string_pretty(&body)?)?;
    } else {
        write!(stdout, "{}", render(&article, &summary.summary_text))?;
    }
    Ok(())
}

pub fn render(article: &str, summary: &str) -> String {
    format!("Original text:\n\n{article}\n\nGenerated summary:\n\n{summary}\n")
}
