//! Notification display formatting

use crate::models::Notification;

pub fn format_notification_list(notifications: &[Notification]) -> String {
    if notifications.is_empty() {
        return "No notifications.\n".to_string();
    }

    let mut output = String::new();
    for n in notifications {
        let unread = if n.read { " " } else { "*" };
        output.push_str(&format!(
            "{} {:<3} {}  {}  {}\n",
            unread,
            n.kind.icon(),
            n.id,
            n.created_at.format("%Y-%m-%d %H:%M"),
            n.title
        ));
        output.push_str(&format!("        {}\n", n.message));
    }

    let unread = notifications.iter().filter(|n| !n.read).count();
    output.push_str(&format!(
        "\n{} notification(s), {} unread\n",
        notifications.len(),
        unread
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationKind;

    #[test]
    fn test_unread_marker() {
        let mut read = Notification::new(
            NotificationKind::GoalReached,
            "Target tercapai",
            "Target Liburan sudah tercapai",
            "goal-reached:x",
        );
        read.read = true;
        let unread = Notification::new(
            NotificationKind::BillOverdue,
            "Tagihan terlambat",
            "Listrik terlambat 2 hari",
            "bill-overdue:y",
        );

        let output = format_notification_list(&[unread, read]);
        assert!(output.starts_with("* !!"));
        assert!(output.contains("2 notification(s), 1 unread"));
    }
}
