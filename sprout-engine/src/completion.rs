//! Task-completion orchestration.
//!
//! Marking a task done touches two rows: the reminder (flagged
//! completed) and the singleton garden row (streak, count, stage,
//! milestone). The garden read-modify-write runs under one async lock so
//! concurrent completions of different reminders serialize instead of
//! losing increments — the reminder write itself needs no such
//! protection, each completion owns its row.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::garden::{CompletionOutcome, GardenProgress, GardenTheme};
use crate::notify::CompletionRecorder;
use crate::storage::Store;
use crate::tracing::prelude::*;

pub struct CompletionEngine<S, R> {
    store: Arc<S>,
    recorder: Arc<R>,
    /// Serializes every garden read-modify-write.
    garden_lock: Mutex<()>,
}

impl<S: Store, R: CompletionRecorder> CompletionEngine<S, R> {
    pub fn new(store: Arc<S>, recorder: Arc<R>) -> Self {
        Self {
            store,
            recorder,
            garden_lock: Mutex::new(()),
        }
    }

    /// Mark a reminder done and grow the garden by one completion.
    ///
    /// The garden row is created on the first completion and updated in
    /// place afterwards. A held or reset streak never reports a
    /// milestone.
    pub async fn complete_task(
        &self,
        reminder_id: i64,
        completion_ms: i64,
    ) -> Result<CompletionOutcome> {
        if reminder_id <= 0 {
            return Err(Error::InvalidReminder(
                crate::reminder::ValidationError::InvalidId(reminder_id),
            ));
        }
        let Some(mut reminder) = self.store.load_reminder(reminder_id).await? else {
            return Err(Error::ReminderNotFound(reminder_id));
        };

        reminder.completed = true;
        self.store.save_reminder(&reminder).await?;

        let outcome = {
            let _guard = self.garden_lock.lock().await;
            let mut garden = self.store.load_garden().await?.unwrap_or_default();
            let outcome = garden.record_completion(completion_ms);
            self.store.save_garden(&garden).await?;
            outcome
        };

        info!(
            reminder_id,
            streak = outcome.streak,
            streak_incremented = outcome.streak_incremented,
            stage = outcome.stage,
            stage_advanced = outcome.stage_advanced,
            milestone = outcome.milestone,
            "task completed"
        );

        // Informational only; never blocks or fails the completion.
        self.recorder.record(&reminder, completion_ms).await;

        Ok(outcome)
    }

    /// Read-model snapshot; an untouched garden reads as all zeros.
    pub async fn progress(&self) -> Result<GardenProgress> {
        Ok(self
            .store
            .load_garden()
            .await?
            .unwrap_or_default()
            .progress())
    }

    /// Swap the cosmetic theme. Unlike every other garden read, this
    /// requires the row to exist already.
    pub async fn set_theme(&self, theme: GardenTheme) -> Result<()> {
        let _guard = self.garden_lock.lock().await;
        let Some(mut garden) = self.store.load_garden().await? else {
            return Err(Error::GardenNotInitialized);
        };
        garden.theme = theme;
        self.store.save_garden(&garden).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garden::from_task_count;
    use crate::notify::LogRecorder;
    use crate::reminder::Reminder;
    use crate::storage::MemoryStore;
    use crate::types::day::MILLIS_PER_DAY;
    use futures::future::join_all;

    const DAY: i64 = MILLIS_PER_DAY;
    const NOON: i64 = 20_000 * DAY + DAY / 2;

    fn engine() -> (CompletionEngine<MemoryStore, LogRecorder>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let engine = CompletionEngine::new(store.clone(), Arc::new(LogRecorder));
        (engine, store)
    }

    async fn seeded_reminder(store: &MemoryStore, title: &str) -> i64 {
        let mut reminder = Reminder::new(title, NOON);
        store.create_reminder(&mut reminder).await.unwrap()
    }

    #[tokio::test]
    async fn first_completion_creates_the_garden() {
        let (engine, store) = engine();
        let id = seeded_reminder(&store, "Water the basil").await;

        let outcome = engine.complete_task(id, NOON).await.unwrap();

        assert!(outcome.streak_incremented);
        assert_eq!(outcome.streak, 1);
        assert_eq!(outcome.milestone, None);

        let garden = store.load_garden().await.unwrap().unwrap();
        assert_eq!(garden.total_tasks_completed, 1);
        let reminder = store.load_reminder(id).await.unwrap().unwrap();
        assert!(reminder.completed);
    }

    #[tokio::test]
    async fn count_and_stage_stay_consistent() {
        let (engine, store) = engine();
        for day in 0..6 {
            let id = seeded_reminder(&store, "daily").await;
            engine.complete_task(id, NOON + day * DAY).await.unwrap();
        }
        let garden = store.load_garden().await.unwrap().unwrap();
        assert_eq!(garden.total_tasks_completed, 6);
        assert_eq!(
            garden.growth_stage,
            from_task_count(garden.total_tasks_completed).index
        );
    }

    #[tokio::test]
    async fn held_streak_reports_no_milestone() {
        let (engine, store) = engine();
        // Six consecutive days...
        for day in 0..6 {
            let id = seeded_reminder(&store, "daily").await;
            engine.complete_task(id, NOON + day * DAY).await.unwrap();
        }
        // ...then two completions on day seven. Only the first one is an
        // increment, and it lands on the milestone.
        let id = seeded_reminder(&store, "first of the day").await;
        let outcome = engine.complete_task(id, NOON + 6 * DAY).await.unwrap();
        assert_eq!(outcome.milestone, Some(7));

        let id = seeded_reminder(&store, "second of the day").await;
        let outcome = engine.complete_task(id, NOON + 6 * DAY + 1).await.unwrap();
        assert!(!outcome.streak_incremented);
        assert_eq!(outcome.milestone, None, "held streak must not re-report");
    }

    #[tokio::test]
    async fn unknown_reminder_is_an_error() {
        let (engine, _store) = engine();
        assert!(matches!(
            engine.complete_task(404, NOON).await,
            Err(Error::ReminderNotFound(404))
        ));
        assert!(matches!(
            engine.complete_task(0, NOON).await,
            Err(Error::InvalidReminder(_))
        ));
    }

    #[tokio::test]
    async fn theme_requires_an_existing_garden() {
        let (engine, store) = engine();
        assert!(matches!(
            engine.set_theme(GardenTheme::Meadow).await,
            Err(Error::GardenNotInitialized)
        ));

        let id = seeded_reminder(&store, "first").await;
        engine.complete_task(id, NOON).await.unwrap();
        engine.set_theme(GardenTheme::Meadow).await.unwrap();
        assert_eq!(
            store.load_garden().await.unwrap().unwrap().theme,
            GardenTheme::Meadow
        );
    }

    #[tokio::test]
    async fn progress_on_an_untouched_garden_is_zeroed() {
        let (engine, _store) = engine();
        let progress = engine.progress().await.unwrap();
        assert_eq!(progress.current_streak, 0);
        assert_eq!(progress.stage.index, 0);
        assert_eq!(progress.achieved_milestones, Vec::<u32>::new());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_completions_never_drop_increments() {
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(CompletionEngine::new(store.clone(), Arc::new(LogRecorder)));

        const TASKS: usize = 32;
        let mut ids = Vec::new();
        for n in 0..TASKS {
            ids.push(seeded_reminder(&store, &format!("task {n}")).await);
        }

        let handles = ids.into_iter().map(|id| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.complete_task(id, NOON).await })
        });
        for result in join_all(handles).await {
            result.unwrap().unwrap();
        }

        let garden = store.load_garden().await.unwrap().unwrap();
        assert_eq!(garden.total_tasks_completed, TASKS as u32);
        assert_eq!(
            garden.growth_stage,
            from_task_count(garden.total_tasks_completed).index
        );
        // All on the same day: the streak held at 1 throughout.
        assert_eq!(garden.current_streak, 1);
    }
}
