//! Recording scheduler double.
//!
//! Keeps the pending set and the full call history in memory so tests
//! can assert both the replace-on-schedule invariant and the exact
//! sequence of wake-ups a scenario produced.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::Result;

use super::AlarmScheduler;

/// One entry of the call history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCall {
    Schedule { reminder_id: i64, fire_at_ms: i64 },
    Cancel { reminder_id: i64 },
}

#[derive(Debug, Default)]
struct Inner {
    pending: HashMap<i64, i64>,
    history: Vec<SchedulerCall>,
}

#[derive(Debug, Default)]
pub struct RecordingScheduler {
    inner: Mutex<Inner>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pending fire time for a reminder, if one is registered.
    pub fn pending(&self, reminder_id: i64) -> Option<i64> {
        self.inner.lock().pending.get(&reminder_id).copied()
    }

    pub fn pending_count(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn history(&self) -> Vec<SchedulerCall> {
        self.inner.lock().history.clone()
    }
}

#[async_trait]
impl AlarmScheduler for RecordingScheduler {
    async fn schedule(&self, reminder_id: i64, fire_at_ms: i64) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.pending.insert(reminder_id, fire_at_ms);
        inner.history.push(SchedulerCall::Schedule {
            reminder_id,
            fire_at_ms,
        });
        Ok(())
    }

    async fn cancel(&self, reminder_id: i64) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.pending.remove(&reminder_id);
        inner.history.push(SchedulerCall::Cancel { reminder_id });
        Ok(())
    }
}
