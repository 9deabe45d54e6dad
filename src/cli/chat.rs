//! Chat with the assistant
//!
//! One message from the command line, or an interactive session on stdin.

use std::io::{self, BufRead, Write};

use clap::Args;
use tracing::warn;

use crate::ai::{ChatMessage, ChatModel, ChatReply, ChatSession, GeminiClient};
use crate::config::settings::Settings;
use crate::error::DompetResult;
use crate::storage::Storage;

use super::today;

#[derive(Args)]
pub struct ChatArgs {
    /// Message to send; starts an interactive session when omitted
    pub message: Option<String>,

    /// Forget the saved conversation first
    #[arg(long)]
    pub reset: bool,

    /// Print the saved conversation and exit
    #[arg(long, conflicts_with_all = ["message", "reset"])]
    pub history: bool,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Handle the chat command
pub fn handle_chat_command(
    storage: &Storage,
    settings: &Settings,
    args: ChatArgs,
) -> DompetResult<()> {
    if args.history {
        print_history(&storage.chat_history.get_all()?);
        return Ok(());
    }

    let client = GeminiClient::new(
        args.api_key.unwrap_or_default(),
        settings.ai.gemini_model.clone(),
        settings.ai.request_timeout_secs,
    )?;
    let session = ChatSession::new(client, storage, settings, today());

    if args.reset {
        session.reset()?;
        println!("Conversation cleared.");
    }

    match args.message {
        Some(message) => {
            let reply = session.send(&message)?;
            print_reply(&reply);
            Ok(())
        }
        None => run_interactive(&session),
    }
}

fn run_interactive<M: ChatModel>(session: &ChatSession<'_, M>) -> DompetResult<()> {
    println!("Dompet assistant. Type /reset to start over, /exit to quit.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;
        let line = line.trim();

        match line {
            "" => continue,
            "/exit" | "/quit" | "exit" | "quit" => break,
            "/reset" => {
                session.reset()?;
                println!("Conversation cleared.");
            }
            message => match session.send(message) {
                Ok(reply) => print_reply(&reply),
                // Keep the session alive on network or model errors
                Err(e) => {
                    warn!(error = %e, "chat turn failed");
                    eprintln!("Error: {}", e);
                }
            },
        }
    }

    Ok(())
}

fn print_reply(reply: &ChatReply) {
    for action in reply.actions.iter().filter(|a| a.mutated && !a.is_error()) {
        println!("  [{}]", action.name);
    }
    println!("{}", reply.text);
    for notification in &reply.notifications {
        println!("{} {}", notification.kind.icon(), notification.message);
    }
}

fn print_history(messages: &[ChatMessage]) {
    if messages.is_empty() {
        println!("No saved conversation.");
        return;
    }

    for message in messages {
        match message {
            ChatMessage::User { text } => println!("you: {}", text),
            ChatMessage::Model { text: Some(text), .. } => println!("dompet: {}", text),
            ChatMessage::Model { calls, .. } => {
                let names: Vec<_> = calls.iter().map(|c| c.name.as_str()).collect();
                println!("dompet: (calls {})", names.join(", "));
            }
            ChatMessage::ToolResults { .. } => {}
        }
    }
}
