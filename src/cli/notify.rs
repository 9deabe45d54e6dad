//! Notification CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::format_notification_list;
use crate::error::DompetResult;
use crate::services::NotificationService;
use crate::storage::Storage;

use super::today;

/// Notification subcommands
#[derive(Subcommand)]
pub enum NotifyCommands {
    /// Run the budget, bill and goal checks now
    Check,

    /// List notifications, newest first
    List {
        /// Only unread notifications
        #[arg(short, long)]
        unread: bool,
    },

    /// Mark a notification read
    Read {
        /// Notification ID (or unique prefix)
        id: String,
    },

    /// Mark every notification read
    ReadAll,

    /// Delete a notification
    Delete {
        /// Notification ID (or unique prefix)
        id: String,
    },

    /// Delete all notifications
    Clear,
}

/// Handle a notification command
pub fn handle_notify_command(
    storage: &Storage,
    settings: &Settings,
    cmd: NotifyCommands,
) -> DompetResult<()> {
    let service = NotificationService::new(storage, &settings.notifications);

    match cmd {
        NotifyCommands::Check => {
            let created = service.generate(today())?;
            if created.is_empty() {
                println!("Nothing new.");
            } else {
                print!("{}", format_notification_list(&created));
            }
        }

        NotifyCommands::List { unread } => {
            print!("{}", format_notification_list(&service.list(unread)?));
        }

        NotifyCommands::Read { id } => {
            let notification = service.find(&id)?;
            let notification = service.mark_read(notification.id)?;
            println!("Marked read: {}", notification.title);
        }

        NotifyCommands::ReadAll => {
            let changed = service.mark_all_read()?;
            println!("Marked {} notification(s) read.", changed);
        }

        NotifyCommands::Delete { id } => {
            let notification = service.find(&id)?;
            let deleted = service.delete(notification.id)?;
            println!("Deleted: {}", deleted.title);
        }

        NotifyCommands::Clear => {
            let removed = service.clear()?;
            println!("Removed {} notification(s).", removed);
        }
    }

    Ok(())
}
