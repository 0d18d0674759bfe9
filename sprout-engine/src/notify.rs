//! Presentation-side collaborator contracts.
//!
//! Both are fire-and-forget: the engine never lets a presentation or
//! analytics failure block persistence or scheduling, so neither method
//! returns a result.

use async_trait::async_trait;

use crate::reminder::Reminder;
use crate::tracing::prelude::*;

/// Posts the user-visible alarm. Invoked for every delivered alarm,
/// before the nag machine runs, regardless of which branch it takes.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn post_alarm(&self, reminder: &Reminder);
}

/// Accepts an informational record of each completion event.
#[async_trait]
pub trait CompletionRecorder: Send + Sync {
    async fn record(&self, reminder: &Reminder, completion_ms: i64);
}

/// Notifier that surfaces alarms on the log. The simulator's
/// "notification tray".
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn post_alarm(&self, reminder: &Reminder) {
        info!(reminder_id = reminder.id, title = %reminder.title, "reminder due");
    }
}

/// Recorder that logs completion events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRecorder;

#[async_trait]
impl CompletionRecorder for LogRecorder {
    async fn record(&self, reminder: &Reminder, completion_ms: i64) {
        debug!(
            reminder_id = reminder.id,
            title = %reminder.title,
            completion_ms,
            "task completed"
        );
    }
}
