//! Async driver around the pure nag transition.
//!
//! Owns the storage and scheduler collaborators and executes the
//! [`Effect`]s a transition step produces, in order. Persistence always
//! runs before the schedule call; when a persist fails the step's
//! schedule is skipped entirely, so an alarm can never fire against
//! state that was not written (fail closed, never double-nag).

use std::sync::Arc;

use time::UtcOffset;

use crate::alarm::AlarmScheduler;
use crate::error::Result;
use crate::reminder::Reminder;
use crate::storage::Store;
use crate::tracing::prelude::*;
use crate::types::cadence::repetitions_until_midnight;

use super::state::{self, Effect, FireOutcome};

pub struct NagDriver<S, A> {
    store: Arc<S>,
    scheduler: Arc<A>,
    /// Device timezone, used for the midnight repetition cutoff.
    local_offset: UtcOffset,
}

impl<S: Store, A: AlarmScheduler> NagDriver<S, A> {
    pub fn new(store: Arc<S>, scheduler: Arc<A>, local_offset: UtcOffset) -> Self {
        Self {
            store,
            scheduler,
            local_offset,
        }
    }

    /// Entry point for the scheduler collaborator: one delivered alarm.
    pub async fn handle_alarm_fired(&self, reminder_id: i64, now_ms: i64) -> Result<FireOutcome> {
        let Some(reminder) = self.store.load_reminder(reminder_id).await? else {
            // Deleted while the alarm was in flight; same benign race as
            // a completion.
            debug!(reminder_id, "alarm fired for missing reminder; dropped");
            return Ok(FireOutcome::IgnoredMissing);
        };

        let step = state::on_alarm_fired(&reminder, now_ms);
        for effect in &step.effects {
            match *effect {
                Effect::Persist => self.store.save_reminder(&step.reminder).await?,
                Effect::Schedule { fire_at_ms } => {
                    self.scheduler.schedule(reminder_id, fire_at_ms).await?;
                }
            }
        }

        match step.outcome {
            FireOutcome::IgnoredCompleted | FireOutcome::IgnoredDisabled => {
                debug!(reminder_id, outcome = ?step.outcome, "stale alarm dropped");
            }
            outcome => {
                info!(
                    reminder_id,
                    now_ms,
                    outcome = ?outcome,
                    next_fire_ms = outcome.next_fire_ms(),
                    "nag step"
                );
            }
        }
        Ok(step.outcome)
    }

    /// Validate, persist, and schedule a reminder's first fire.
    ///
    /// For nag reminders the repetition cap is clamped to the midnight
    /// budget — repeats never cross the day boundary, and a requested
    /// cap is never raised.
    pub async fn arm(&self, reminder: &mut Reminder) -> Result<i64> {
        reminder.validate()?;

        if reminder.nag_enabled {
            if let Some(interval_ms) = reminder.nag_interval_ms {
                let budget =
                    repetitions_until_midnight(reminder.start_time_ms, interval_ms, self.local_offset);
                if budget < reminder.total_repetitions {
                    debug!(
                        reminder_id = reminder.id,
                        requested = reminder.total_repetitions,
                        budget,
                        "repetition cap clamped to the midnight budget"
                    );
                    reminder.total_repetitions = budget;
                }
            }
        }
        reminder.repetition_index = 0;
        reminder.in_micro_loop = false;
        reminder.micro_loop_entered_ms = None;
        reminder.completed = false;

        let id = self.store.create_reminder(reminder).await?;
        self.scheduler.schedule(id, reminder.start_time_ms).await?;
        info!(
            reminder_id = id,
            start_time_ms = reminder.start_time_ms,
            nag = reminder.nag_enabled,
            total_repetitions = reminder.total_repetitions,
            "reminder armed"
        );
        Ok(id)
    }

    /// Persist `enabled = false` and drop the pending alarm.
    ///
    /// Disabling something already gone is a no-op.
    pub async fn disable(&self, reminder_id: i64) -> Result<()> {
        let Some(mut reminder) = self.store.load_reminder(reminder_id).await? else {
            warn!(reminder_id, "disable requested for missing reminder");
            return Ok(());
        };
        reminder.enabled = false;
        reminder.in_micro_loop = false;
        reminder.micro_loop_entered_ms = None;
        self.store.save_reminder(&reminder).await?;
        self.scheduler.cancel(reminder_id).await?;
        info!(reminder_id, "reminder disabled");
        Ok(())
    }

    /// Remove the row and drop the pending alarm.
    pub async fn delete(&self, reminder_id: i64) -> Result<()> {
        self.store.delete_reminder(reminder_id).await?;
        self.scheduler.cancel(reminder_id).await?;
        info!(reminder_id, "reminder deleted");
        Ok(())
    }
}
