use std::io::{self, Write};

use clap::Args;
use serde::Serialize;

use crate::config::Config;
use crate::error::Error;
use crate::hub::{Classification, InferenceClient, TextClassificationPipeline};

pub const EXAMPLE_TEXT: &str = "I love using the Hugging Face transformers library!";

#[derive(Debug, Args, Clone, Default)]
pub struct SentimentArgs {
    /// Texts to classify. Defaults to a built-in example sentence.
    pub texts: Vec<String>,
    /// Model id on the inference endpoint.
    #[arg(long)]
    pub model: Option<String>,
    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct SentimentOutput<'a> {
    text: &'a str,
    label: &'a str,
    score: f64,
}

pub async fn run(args: SentimentArgs) -> Result<(), Error> {
    let config = Config::load()?;
    let model = args.model.unwrap_or(config.sentiment.model);
    let client = InferenceClient::from_env(config.sentiment.base_url)
        .with_retry(config.http.retry_config());
    let pipeline = TextClassificationPipeline::new(client, model);

    let texts = if args.texts.is_empty() {
        vec![EXAMPLE_TEXT.to_string()]
    } else {
        args.texts
    };
    tracing::info!(model = %pipeline.model(), inputs = texts.len(), "classifying");

    let results = match texts.as_slice() {
        [text] => vec![pipeline.classify(text).await?],
        _ => pipeline.classify_batch(&texts).await?,
    };

    let mut stdout = io::stdout().lock();
    if args.json {
        let outputs: Vec<_> = texts
            .iter()
            .zip(&results)
            .map(|(text, result)| SentimentOutput {
                text,
                label: &result.label,
                score: result.score,
            })
            .collect();
        let rendered = match outputs.as_slice() {
            [single] => serde_json::to_string_pretty(single)?,
            many => serde_json::to_string_pretty(many)?,
        };
        writeln!(stdout, "{rendered}")?;
    } else {
        for (index, (text, result)) in texts.iter().zip(&results).enumerate() {
            if index > 0 {
                writeln!(stdout)?;
            }
            write!(stdout, "{}", render(text, result))?;
        }
    }
    Ok(())
}

pub fn render(text: &str, result: &Classification) -> String {
    format!(
        "Text: {text}\nPredicted sentiment: {}\nConfidence: {:.4}\n",
        result.label, result.score
    )
}
