//! Dashboard command

use crate::config::settings::Settings;
use crate::display::format_month_summary;
use crate::error::DompetResult;
use crate::services::{NotificationService, SummaryService};
use crate::storage::Storage;

use super::{parse_month_or_current, today};

/// Print the summary for a month (current month by default)
pub fn handle_summary_command(
    storage: &Storage,
    settings: &Settings,
    month: Option<String>,
) -> DompetResult<()> {
    let month = parse_month_or_current(month.as_deref())?;
    let today = today();
    let service = SummaryService::new(storage, settings.notifications.budget_warning_percent);

    let summary = service.month_summary(month, today)?;
    print!(
        "{}",
        format_month_summary(&summary, service.overall_balance()?, today)
    );

    let unread = NotificationService::new(storage, &settings.notifications).unread_count()?;
    if unread > 0 {
        println!("\n{} unread notification(s). Run `dompet notify list`.", unread);
    }

    Ok(())
}
