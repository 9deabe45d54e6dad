//! Text and receipt parsing commands

use std::fs;
use std::path::PathBuf;

use clap::Subcommand;

use crate::ai::openrouter::mime_for_path;
use crate::ai::OpenRouterClient;
use crate::config::settings::Settings;
use crate::error::{DompetError, DompetResult};
use crate::services::{CreateTransactionInput, TransactionService};
use crate::storage::Storage;

use super::{announce_notifications, today};

/// AI subcommands
#[derive(Subcommand)]
pub enum AiCommands {
    /// Turn a sentence into a transaction ("makan siang 35rb")
    Parse {
        /// Free text describing one transaction
        text: String,
        /// Record the parsed transaction
        #[arg(short, long)]
        save: bool,
        /// OpenRouter API key
        #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Read a receipt photo (JPEG, PNG or WebP)
    Scan {
        /// Image file
        image: PathBuf,
        /// Record the receipt total as an expense
        #[arg(short, long)]
        save: bool,
        /// OpenRouter API key
        #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
}

/// Handle an AI command
pub fn handle_ai_command(
    storage: &Storage,
    settings: &Settings,
    cmd: AiCommands,
) -> DompetResult<()> {
    let today = today();

    match cmd {
        AiCommands::Parse {
            text,
            save,
            api_key,
        } => {
            let parsed = client(settings, api_key)?.parse_transaction_text(&text, today)?;
            println!("Type:        {}", parsed.kind.label());
            println!("Amount:      {}", parsed.amount);
            println!("Category:    {}", parsed.category);
            println!("Description: {}", parsed.description);
            println!("Date:        {}", parsed.date);

            if save {
                record(storage, settings, parsed.to_input())?;
            }
        }

        AiCommands::Scan {
            image,
            save,
            api_key,
        } => {
            let mime = mime_for_path(&image).ok_or_else(|| {
                DompetError::Validation(format!(
                    "Unsupported image type: {} (use jpg, png or webp)",
                    image.display()
                ))
            })?;
            let bytes = fs::read(&image)?;
            let receipt = client(settings, api_key)?.scan_receipt(&bytes, mime)?;

            if let Some(merchant) = &receipt.merchant {
                println!("Merchant: {}", merchant);
            }
            if let Some(date) = receipt.date {
                println!("Date:     {}", date);
            }
            for item in &receipt.items {
                println!("  {:<30} x{:<4} {:>14}", item.name, item.quantity, item.price.to_string());
            }
            println!("Total:    {}", receipt.total);
            println!("Category: {}", receipt.category);

            if save {
                record(storage, settings, receipt.to_input(today))?;
            }
        }
    }

    Ok(())
}

fn client(settings: &Settings, api_key: Option<String>) -> DompetResult<OpenRouterClient> {
    OpenRouterClient::new(
        api_key.unwrap_or_default(),
        settings.ai.openrouter_model.clone(),
        settings.ai.request_timeout_secs,
    )
}

fn record(storage: &Storage, settings: &Settings, input: CreateTransactionInput) -> DompetResult<()> {
    let txn = TransactionService::new(storage).create(input)?;
    println!("\nRecorded {} {} ({})", txn.kind.label(), txn.amount, txn.category);
    println!("  ID: {}", txn.id);
    announce_notifications(storage, settings)
}
