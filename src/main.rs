use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, shells};
use pipedemo::commands::chat::{self, ChatArgs};
use pipedemo::commands::config::{self, ConfigArgs};
use pipedemo::commands::sentiment::{self, SentimentArgs};
use pipedemo::commands::summarize::{self, SummarizeArgs};
use pipedemo::commands::init_runtime;

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  pipedemo sentiment \"What a lovely day\"\n  pipedemo summarize --max-length 40 --min-length 10 \"$(cat article.txt)\"\n  GOOGLE_API_KEY=... pipedemo chat\n  pipedemo config check\n  pipedemo completion bash > ~/.local/share/bash-completion/completions/pipedemo";

const CHAT_HELP: &str = "Type a question and press enter. Gemini may call the remote letter counter to answer it.\nType 'exit' to quit.";

#[derive(Debug, Parser)]
#[command(
    name = "pipedemo",
    about = "Hosted NLP pipeline demos and a tool-calling chat relay",
    version,
    long_version = env!("PD_LONG_VERSION"),
    after_help = ROOT_HELP_EXAMPLES
)]
struct Cli {
    /// Log progress to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Classify the sentiment of one or more texts")]
    Sentiment(SentimentArgs),
    #[command(about = "Summarize a text")]
    Summarize(SummarizeArgs),
    #[command(about = "Chat with Gemini and its letter counter tool", after_help = CHAT_HELP)]
    Chat(ChatArgs),
    #[command(about = "Inspect local config")]
    Config(ConfigArgs),
    #[command(about = "Generate shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

fn print_completion(shell: CompletionShell) {
    let mut cmd = Cli::command();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, "pipedemo", &mut io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, "pipedemo", &mut io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, "pipedemo", &mut io::stdout()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_runtime(cli.verbose);

    let result = match cli.command {
        Commands::Sentiment(args) => sentiment::run(args).await,
        Commands::Summarize(args) => summarize::run(args).await,
        Commands::Chat(args) => chat::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("{err}");
        process::exit(1);
    }
}
