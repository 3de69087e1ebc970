use std::process;

use clap::Parser;
use pipedemo::commands::chat::{self, ChatArgs};
use pipedemo::commands::init_runtime;

#[derive(Debug, Parser)]
#[command(
    name = "pd-chat",
    about = "Chat with Gemini and its remote letter counter tool",
    long_version = env!("PD_LONG_VERSION"),
    version
)]
struct Cli {}

#[tokio::main]
async fn main() {
    Cli::parse();
    init_runtime(false);
    if let Err(err) = chat::run(ChatArgs::default()).await {
        eprintln!("{err}");
        process::exit(1);
    }
}
