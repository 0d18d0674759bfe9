//! The garden: the gamification aggregate grown by completing tasks.
//!
//! One row exists per installation, created lazily by the first
//! completion. All mutation funnels through [`GardenState::record_completion`]
//! so the derived fields can never drift: the growth stage always equals
//! the table lookup for the cumulative count, and the longest streak
//! never falls below the current one.

mod milestone;
mod stage;
mod streak;

pub use milestone::{achieved, just_reached, next_after, MILESTONES};
pub use stage::{from_task_count, progress_to_next, table, GrowthStage};
pub use streak::{update as update_streak, StreakUpdate};

use serde::{Deserialize, Serialize};

/// Cosmetic garden skin. Orthogonal to every counter invariant.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "kebab-case")]
pub enum GardenTheme {
    #[default]
    Classic,
    Meadow,
    Desert,
    Tropics,
}

/// The singleton gamification row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GardenState {
    /// Monotonically non-decreasing; exactly +1 per completion event.
    pub total_tasks_completed: u32,
    /// Derived: always `from_task_count(total_tasks_completed).index`.
    pub growth_stage: u8,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_completion_ms: Option<i64>,
    pub theme: GardenTheme,
}

impl Default for GardenState {
    fn default() -> Self {
        Self {
            total_tasks_completed: 0,
            growth_stage: 0,
            current_streak: 0,
            longest_streak: 0,
            last_completion_ms: None,
            theme: GardenTheme::default(),
        }
    }
}

/// Everything one completion event did to the garden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub streak_incremented: bool,
    pub streak: u32,
    pub stage_advanced: bool,
    pub stage: u8,
    /// Present only when an incremented streak landed exactly on a
    /// milestone value.
    pub milestone: Option<u32>,
}

/// Read-model snapshot for the garden screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GardenProgress {
    pub stage: GrowthStage,
    pub percent_to_next_stage: u8,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub next_milestone: Option<u32>,
    pub achieved_milestones: Vec<u32>,
    pub theme: GardenTheme,
}

impl GardenState {
    /// Fold one task completion into the aggregate.
    ///
    /// Held and reset streaks never report a milestone — only the
    /// increment path can land on one.
    pub fn record_completion(&mut self, completion_ms: i64) -> CompletionOutcome {
        let streaks = streak::update(
            self.current_streak,
            self.longest_streak,
            self.last_completion_ms,
            completion_ms,
        );
        self.current_streak = streaks.streak;
        self.longest_streak = streaks.longest;
        self.last_completion_ms = Some(completion_ms);

        let previous_stage = self.growth_stage;
        self.total_tasks_completed = self.total_tasks_completed.saturating_add(1);
        self.growth_stage = stage::from_task_count(self.total_tasks_completed).index;

        let milestone = if streaks.incremented {
            milestone::just_reached(streaks.streak)
        } else {
            None
        };

        CompletionOutcome {
            streak_incremented: streaks.incremented,
            streak: streaks.streak,
            stage_advanced: self.growth_stage > previous_stage,
            stage: self.growth_stage,
            milestone,
        }
    }

    pub fn progress(&self) -> GardenProgress {
        GardenProgress {
            stage: stage::from_task_count(self.total_tasks_completed),
            percent_to_next_stage: stage::progress_to_next(self.total_tasks_completed),
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            next_milestone: milestone::next_after(self.current_streak),
            achieved_milestones: milestone::achieved(self.longest_streak),
            theme: self.theme,
        }
    }
}
