//! User-facing notifications.
//!
//! Outcomes of multi-step runs are surfaced here; parse misses and validation
//! misses only show up as the aggregate counts in these messages.

use std::collections::VecDeque;

/// Oldest entries are dropped past this many.
pub const MAX_NOTIFICATIONS: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    /// Informational text, e.g. "Removed 2 invalid account(s)".
    Text,
    /// A contract request finished.
    Complete,
    Failure,
}

/// A notification entry with message and timestamp
#[derive(Clone, Debug)]
pub struct NotificationEntry {
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl NotificationEntry {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            timestamp: chrono::Local::now(),
        }
    }

    pub fn text(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Text, message)
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Complete, message)
    }

    /// Generic failure wording, with the underlying error appended.
    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self::new(
            NotificationKind::Failure,
            format!("Something went wrong! {error}"),
        )
    }

    pub fn time_ago(&self) -> String {
        let now = chrono::Local::now();
        let duration = now.signed_duration_since(self.timestamp);
        if duration.num_seconds() < 60 {
            "just now".to_string()
        } else if duration.num_minutes() < 60 {
            format!("{}m ago", duration.num_minutes())
        } else if duration.num_hours() < 24 {
            format!("{}h ago", duration.num_hours())
        } else {
            self.timestamp.format("%m/%d %H:%M").to_string()
        }
    }
}

/// Push a notification, trimming the queue to [`MAX_NOTIFICATIONS`].
pub fn push_notification(queue: &mut VecDeque<NotificationEntry>, entry: NotificationEntry) {
    match entry.kind {
        NotificationKind::Failure => tracing::warn!("{}", entry.message),
        _ => tracing::info!("{}", entry.message),
    }
    queue.push_back(entry);
    while queue.len() > MAX_NOTIFICATIONS {
        queue.pop_front();
    }
}
