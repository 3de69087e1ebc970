use std::process;

use clap::Parser;
use pipedemo::commands::sentiment::{self, SentimentArgs};
use pipedemo::commands::init_runtime;

#[derive(Debug, Parser)]
#[command(
    name = "pd-sentiment",
    about = "Classify the built-in example sentence",
    long_version = env!("PD_LONG_VERSION"),
    version
)]
struct Cli {}

#[tokio::main]
async fn main() {
    Cli::parse();
    init_runtime(false);
    if let Err(err) = sentiment::run(SentimentArgs::default()).await {
        eprintln!("{err}");
        process::exit(1);
    }
}
