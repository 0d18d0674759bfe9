//! Day-boundary streak accounting.
//!
//! One decision per completion event, driven by the epoch-day distance
//! from the previous completion:
//!
//! | days between | action |
//! |--------------|--------|
//! | no prior completion | start at 1 |
//! | 0 (same day) | hold |
//! | 1 (consecutive day) | increment |
//! | ≥ 2, or negative | reset to 1 |
//!
//! A hold is the only case that does not count as an increment; a reset
//! *does* (the day produced genuine forward progress from zero), but
//! milestone checks downstream still only react to values the increment
//! path lands on. Runs exactly once per completion event, never per
//! alarm fire.

use crate::types::day::days_between;

/// Result of folding one completion into the streak counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    pub streak: u32,
    pub longest: u32,
    /// False only when the completion landed on the same day as the
    /// previous one.
    pub incremented: bool,
}

/// Fold a completion at `completion_ms` into the previous counters.
pub fn update(
    streak: u32,
    longest: u32,
    last_completion_ms: Option<i64>,
    completion_ms: i64,
) -> StreakUpdate {
    let (new_streak, incremented) = match last_completion_ms {
        None => (1, true),
        Some(last_ms) => match days_between(last_ms, completion_ms) {
            0 => (streak, false),
            1 => (streak + 1, true),
            // Gap, or an out-of-order timestamp: start over.
            _ => (1, true),
        },
    };
    StreakUpdate {
        streak: new_streak,
        longest: longest.max(new_streak),
        incremented,
    }
}
