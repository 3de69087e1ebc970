use std::process;

use clap::Parser;
use pipedemo::commands::summarize::{self, SummarizeArgs};
use pipedemo::commands::init_runtime;

#[derive(Debug, Parser)]
#[command(
    name = "pd-summarize",
    about = "Summarize the built-in example article",
    long_version = env!("PD_LONG_VERSION"),
    version
)]
struct Cli {}

#[tokio::main]
async fn main() {
    Cli::parse();
    init_runtime(false);
    if let Err(err) = summarize::run(SummarizeArgs::default()).await {
        eprintln!("{err}");
        process::exit(1);
    }
}
