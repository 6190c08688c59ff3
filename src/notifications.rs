use crate::models::{
    AppData, Item, ItemStatus, MarkReadResponse, Notification, NotificationBuckets, NotificationKind,
    NotificationSummary,
};
use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use tracing::info;

const THRESHOLDS: [(i64, NotificationKind, &str); 3] = [
    (30, NotificationKind::Days30, "Items expiring within 30 days"),
    (14, NotificationKind::Days14, "Items expiring within 14 days"),
    (7, NotificationKind::Days7, "Items expiring within 7 days"),
];

/// Creates the notifications due on `today`. Returns how many were created.
///
/// Each threshold fires once per item for its whole lifetime; overdue
/// reminders only go out on Mondays and at most once per item per day.
pub fn generate_at(today: NaiveDate, data: &mut AppData) -> usize {
    let mut created = 0;

    if today.weekday() == Weekday::Mon {
        let overdue: Vec<Item> = in_use(data)
            .filter(|item| item.expires_on < today)
            .filter(|item| !exists(data, item.id, NotificationKind::Overdue, Some(today)))
            .cloned()
            .collect();
        for item in overdue {
            let body = format!("{} is past its expiry date ({})", item.name, item.expires_on);
            push(data, &item, NotificationKind::Overdue, "Some items have expired", body, today);
            created += 1;
        }
    }

    for (days, kind, title) in THRESHOLDS {
        let horizon = today + Duration::days(days);
        let due: Vec<Item> = in_use(data)
            .filter(|item| item.expires_on >= today && item.expires_on <= horizon)
            .filter(|item| !exists(data, item.id, kind, None))
            .cloned()
            .collect();
        for item in due {
            let remaining = (item.expires_on - today).num_days();
            let body = format!(
                "{} expires in {remaining} days ({})",
                item.name, item.expires_on
            );
            push(data, &item, kind, title, body, today);
            created += 1;
        }
    }

    if created > 0 {
        info!("generated {created} notifications for {today}");
    }
    created
}

pub fn summary(data: &AppData) -> NotificationSummary {
    let mut buckets = NotificationBuckets::default();
    let mut total_unread = 0u64;
    for notification in data.notifications.iter().filter(|n| !n.is_read()) {
        total_unread += 1;
        let counter = match notification.kind {
            NotificationKind::Overdue => &mut buckets.expired,
            NotificationKind::Days7 => &mut buckets.week,
            NotificationKind::Days14 => &mut buckets.biweek,
            NotificationKind::Days30 => &mut buckets.month,
        };
        *counter += 1;
    }
    NotificationSummary {
        total_unread,
        buckets,
    }
}

pub fn mark_read(data: &mut AppData, kind: NotificationKind) -> MarkReadResponse {
    let now = Local::now();
    for notification in data
        .notifications
        .iter_mut()
        .filter(|n| n.kind == kind && !n.is_read())
    {
        notification.read_at = Some(now);
    }
    MarkReadResponse {
        success: true,
        unread_total: summary(data).total_unread,
    }
}

fn in_use(data: &AppData) -> impl Iterator<Item = &Item> {
    data.items
        .iter()
        .filter(|item| item.status == ItemStatus::Using)
}

fn exists(data: &AppData, item_id: u64, kind: NotificationKind, on: Option<NaiveDate>) -> bool {
    data.notifications.iter().any(|n| {
        n.item_id == item_id && n.kind == kind && on.is_none_or(|day| n.scheduled_for == day)
    })
}

fn push(
    data: &mut AppData,
    item: &Item,
    kind: NotificationKind,
    title: &str,
    body: String,
    today: NaiveDate,
) {
    let id = data.allocate_notification_id();
    data.notifications.push(Notification {
        id,
        item_id: item.id,
        kind,
        title: title.to_string(),
        body,
        scheduled_for: today,
        read_at: None,
    });
}
