//! Alarm scheduling contract and implementations.
//!
//! The contract mirrors what mobile platform schedulers provide through
//! identity reuse: **at most one pending wake-up per reminder id**.
//! `schedule` replaces any prior pending alarm for the same id, so the
//! nag machine never needs a separate cancel-then-schedule step. The
//! [`RecordingScheduler`] double encodes the same invariant for tests.

mod recording;
mod service;

pub use recording::{RecordingScheduler, SchedulerCall};
pub use service::{AlarmFired, AlarmService, AlarmServiceHandle, SystemClock, WallClock};

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait AlarmScheduler: Send + Sync {
    /// Register the single pending wake-up for `reminder_id`, replacing
    /// any prior pending wake-up for that id.
    async fn schedule(&self, reminder_id: i64, fire_at_ms: i64) -> Result<()>;

    /// Drop the pending wake-up for `reminder_id`, if any.
    async fn cancel(&self, reminder_id: i64) -> Result<()>;
}
