use std::io::{self, IsTerminal};

use clap::Args;

use crate::config::Config;
use crate::error::Error;
use crate::gemini::GeminiClient;
use crate::gradio::GradioClient;
use crate::letter_counter::{self, RemoteLetterCounter};
use crate::relay::Relay;
use crate::tools::Tool;

#[derive(Debug, Args, Clone, Default)]
pub struct ChatArgs {
    /// Gemini model id.
    #[arg(long)]
    pub model: Option<String>,
    /// Root URL of the Gradio app serving the letter counter.
    #[arg(long)]
    pub tool_server: Option<String>,
    /// Gradio endpoint name.
    #[arg(long)]
    pub api_name: Option<String>,
}

pub async fn run(args: ChatArgs) -> Result<(), Error> {
    let config = Config::load()?;
    let chat = config.chat;

    // Fails before anything goes over the network when the key is missing.
    let gemini = GeminiClient::from_env(args.model.unwrap_or(chat.model))?
        .with_base_url(chat.base_url)
        .with_retry(config.http.retry_config())
        .bind_tools(vec![Tool::from_functions(vec![letter_counter::declaration()])]);

    let tool_server = args.tool_server.unwrap_or(chat.tool_server);
    let api_name = args.api_name.unwrap_or(chat.api_name);
    tracing::info!(model = %gemini.model(), %tool_server, %api_name, "starting chat");
    let counter = RemoteLetterCounter::new(GradioClient::from_env(tool_server), api_name);

    let stdout = io::stdout();
    let styled = stdout.is_terminal();
    let mut relay = Relay::new(gemini.start_chat(), counter).with_color(styled);
    relay.run(io::stdin().lock(), stdout.lock()).await?;
    Ok(())
}
