//! The reminder row: the unit that gets scheduled, nagged, and completed.
//!
//! A reminder with id 0 is transient; storage assigns a positive id on
//! first persist. The nag fields drive the alarm lifecycle in
//! [`crate::nag`]; everything else is carried for the surrounding app.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by boundary validation of caller-supplied reminders.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("reminder id must be positive, got {0}")]
    InvalidId(i64),

    #[error("title must not be blank")]
    BlankTitle,

    #[error("nag interval must be positive, got {0}")]
    NonPositiveInterval(i64),

    #[error("nag mode requires a repeat interval")]
    MissingInterval,

    #[error("nag mode requires at least one repetition")]
    NoRepetitions,

    #[error("micro loop marked active without an entry timestamp")]
    MicroLoopWithoutEntryTime,
}

/// How a reminder recurs once its day is done.
///
/// Recurrence expansion (picking the next calendar occurrence) belongs to
/// the surrounding app; the engine only carries the kind so the row
/// round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "kebab-case")]
pub enum Recurrence {
    OneTime,
    Daily,
    /// ISO weekday numbers, 1 = Monday through 7 = Sunday.
    WeeklyOnDays(Vec<u8>),
    SpecificDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// 0 until persisted.
    pub id: i64,
    pub title: String,
    pub recurrence: Recurrence,

    /// Absolute scheduled fire time.
    pub start_time_ms: i64,
    /// The very first scheduled time, preserved across edits and imports.
    pub original_start_time_ms: i64,

    pub nag_enabled: bool,
    /// Main repeat interval. `None` for reminders that fire once.
    pub nag_interval_ms: Option<i64>,
    /// Cap on main repetitions. Armed values never cross midnight; see
    /// [`crate::types::cadence`].
    pub total_repetitions: u32,
    /// Index of the most recently scheduled main repetition, 0-based.
    pub repetition_index: u32,

    pub in_micro_loop: bool,
    /// Set when the micro loop was entered; present whenever
    /// `in_micro_loop` is true.
    pub micro_loop_entered_ms: Option<i64>,

    pub completed: bool,
    pub enabled: bool,
}

impl Reminder {
    /// A fresh, enabled, one-shot reminder. Not yet persisted (id 0).
    pub fn new(title: impl Into<String>, start_time_ms: i64) -> Self {
        Self {
            id: 0,
            title: title.into(),
            recurrence: Recurrence::OneTime,
            start_time_ms,
            original_start_time_ms: start_time_ms,
            nag_enabled: false,
            nag_interval_ms: None,
            total_repetitions: 0,
            repetition_index: 0,
            in_micro_loop: false,
            micro_loop_entered_ms: None,
            completed: false,
            enabled: true,
        }
    }

    /// Enable nag mode with the given main interval and repetition cap.
    pub fn with_nag(mut self, interval_ms: i64, total_repetitions: u32) -> Self {
        self.nag_enabled = true;
        self.nag_interval_ms = Some(interval_ms);
        self.total_repetitions = total_repetitions;
        self
    }

    /// Boundary validation. Checked before a reminder is armed or
    /// persisted on behalf of a caller.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankTitle);
        }
        if self.nag_enabled {
            match self.nag_interval_ms {
                None => return Err(ValidationError::MissingInterval),
                Some(ms) if ms <= 0 => return Err(ValidationError::NonPositiveInterval(ms)),
                Some(_) => {}
            }
            if self.total_repetitions == 0 {
                return Err(ValidationError::NoRepetitions);
            }
        } else if let Some(ms) = self.nag_interval_ms {
            if ms <= 0 {
                return Err(ValidationError::NonPositiveInterval(ms));
            }
        }
        if self.in_micro_loop && self.micro_loop_entered_ms.is_none() {
            return Err(ValidationError::MicroLoopWithoutEntryTime);
        }
        Ok(())
    }

    /// The absolute time of the next main repetition, if one remains.
    ///
    /// Repetition `n` fires at `start + n * interval`; the next one is
    /// `repetition_index + 1`, valid only while it stays under the cap.
    pub fn next_main_fire_ms(&self) -> Option<i64> {
        let interval = self.nag_interval_ms?;
        let next_index = self.repetition_index.checked_add(1)?;
        if next_index >= self.total_repetitions {
            return None;
        }
        Some(self.start_time_ms + i64::from(next_index) * interval)
    }
}
