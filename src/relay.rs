//! Console relay between the user, the reasoning service, and the letter counter.
//!
//! Each user line is sent to the service. When the reply asks for the
//! letter-counter tool, the relay makes exactly one remote call, forwards the
//! count (or `-1` on failure) as a function response, and prints the final
//! answer. Replies without a tool call are printed as they are.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use owo_colors::OwoColorize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::gemini::{GeminiError, Reply};
use crate::letter_counter::{FAILED_CALL, LetterCountArgs, LetterCounter, TOOL_NAME};

pub const BANNER: &str =
    "Hello! I'm Gemini, connected to your letter counter tool. Ask away. (type 'exit' to quit)";

/// The conversational side of the relay.
#[async_trait]
pub trait ReasoningService: Send {
    async fn send_text(&mut self, text: &str) -> Result<Reply, GeminiError>;

    async fn send_function_response(
        &mut self,
        name: &str,
        response: Value,
    ) -> Result<Reply, GeminiError>;

    /// Forgets a function call the relay will not answer.
    fn discard_pending_call(&mut self);
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Service(#[from] GeminiError),
    #[error("console I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Tool invocation requested by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub name: String,
    pub args: Value,
}

/// One completed exchange.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Turn {
    pub user: String,
    pub reply: String,
    pub tool_call: Option<ToolCallRequest>,
    /// Count sent back for a letter-counter call, `-1` when the call failed.
    /// Stays empty for calls to undeclared tools.
    pub tool_result: Option<i64>,
}

/// In-memory record of the current run. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

pub fn is_exit(line: &str) -> bool {
    line.to_lowercase() == "exit"
}

pub struct Relay<S, C> {
    service: S,
    counter: C,
    conversation: Conversation,
    styled: bool,
}

impl<S, C> Relay<S, C>
where
    S: ReasoningService,
    C: LetterCounter,
{
    pub fn new(service: S, counter: C) -> Self {
        Self {
            service,
            counter,
            conversation: Conversation::default(),
            styled: false,
        }
    }

    /// Colors the speaker labels.
    pub fn with_color(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Reads lines until `exit` or end of input.
    pub async fn run<R, W>(&mut self, mut input: R, mut output: W) -> Result<(), RelayError>
    where
        R: BufRead,
        W: Write,
    {
        writeln!(output, "{BANNER}")?;

        let mut line = String::new();
        loop {
            write!(output, "{} ", self.user_label())?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                break;
            }

            let prompt = line.trim_end_matches(['\n', '\r']);
            if is_exit(prompt) {
                break;
            }
            if prompt.trim().is_empty() {
                continue;
            }

            self.handle_turn(prompt, &mut output).await?;
        }

        tracing::info!(turns = self.conversation.len(), "chat finished");
        Ok(())
    }

    /// Runs one user turn to completion.
    pub async fn handle_turn<W: Write>(
        &mut self,
        text: &str,
        output: &mut W,
    ) -> Result<(), RelayError> {
        let mut turn = Turn {
            user: text.to_string(),
            ..Turn::default()
        };

        let reply = match self.service.send_text(text).await? {
            Reply::Text(text) => text,
            Reply::FunctionCall(call) => {
                writeln!(output, "--- Gemini decided to call tool: {} ---", call.name)?;

                let response = if call.name == TOOL_NAME {
                    let result = self.invoke_letter_counter(&call.args, output).await?;
                    turn.tool_result = Some(result);
                    json!({ "result": result })
                } else {
                    tracing::warn!(tool = %call.name, "model requested an undeclared tool");
                    writeln!(output, "--- Tool {} is not available ---", call.name)?;
                    json!({ "error": format!("unknown tool {}", call.name) })
                };

                writeln!(
                    output,
                    "--- Sending tool result back to Gemini for the final reply ---"
                )?;
                let reply = self
                    .service
                    .send_function_response(&call.name, response)
                    .await?;
                if let Reply::FunctionCall(next) = &reply {
                    tracing::warn!(tool = %next.name, "ignoring a second tool call in the same turn");
                }
                self.service.discard_pending_call();

                turn.tool_call = Some(ToolCallRequest {
                    name: call.name,
                    args: call.args,
                });
                reply.text().to_string()
            }
        };

        writeln!(output, "{} {reply}", self.service_label())?;
        turn.reply = reply;
        self.conversation.turns.push(turn);
        Ok(())
    }

    async fn invoke_letter_counter<W: Write>(
        &self,
        args: &Value,
        output: &mut W,
    ) -> io::Result<i64> {
        match LetterCountArgs::from_args(args) {
            Ok(args) => self.call_letter_counter(&args.word, &args.letter, output).await,
            Err(err) => {
                tracing::warn!(error = %err, "rejecting letter counter call");
                writeln!(output, "Tool server call failed: {err}")?;
                Ok(FAILED_CALL)
            }
        }
    }

    /// Makes the single remote call of a turn. Any failure becomes `-1`.
    pub async fn call_letter_counter<W: Write>(
        &self,
        word: &str,
        letter: &str,
        output: &mut W,
    ) -> io::Result<i64> {
        writeln!(output, "--- Calling remote tool server ---")?;
        writeln!(output, "    server: {}", self.counter.endpoint())?;
        writeln!(output, "    args: word='{word}', letter='{letter}'")?;

        match self.counter.count(word, letter).await {
            Ok(count) => {
                writeln!(output, "--- Tool server returned: {count} ---")?;
                Ok(count)
            }
            Err(err) => {
                tracing::warn!(error = %err, server = %self.counter.endpoint(), "letter counter call failed");
                writeln!(output, "Tool server call failed: {err}")?;
                Ok(FAILED_CALL)
            }
        }
    }

    fn user_label(&self) -> String {
        if self.styled {
            "You:".green().bold().to_string()
        } else {
            "You:".to_string()
        }
    }

    fn service_label(&self) -> String {
        if self.styled {
            "Gemini:".cyan().bold().to_string()
        } else {
            "Gemini:".to_string()
        }
    }
}
