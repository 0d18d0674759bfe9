//! Pure transition logic for the nag alarm lifecycle.
//!
//! Every delivered alarm pushes a reminder through one step of this
//! machine. The main loop is the reminder's primary repeat cadence
//! (`nag_interval_ms`, capped by `total_repetitions`); the micro loop is
//! a faster bounded re-nag cadence entered after any main fire, pestering
//! the user for up to 30 minutes before yielding back to the main cadence.
//!
//! # State Machine
//!
//! ```text
//!               alarm fired                 alarm fired,
//!            (main or initial)           elapsed < 30 min
//!  MainLoop ──────────────────► MicroLoop ────────────────┐
//!     ▲                            │  ▲                   │
//!     │     elapsed >= 30 min,     │  └───────────────────┘
//!     │     next repetition left   │
//!     └────────────────────────────┤
//!                                  │  elapsed >= 30 min,
//!                                  │  repetitions exhausted
//!                                  ▼
//!                               (quiet until the user interacts)
//! ```
//!
//! The transition function is pure: it never touches storage or the
//! scheduler. It returns the updated row together with the [`Effect`]s
//! the caller must execute *in order* — persistence always precedes
//! scheduling so an alarm can never fire against unpersisted state.

use crate::reminder::Reminder;
use crate::types::day::{MILLIS_PER_HOUR, MILLIS_PER_MINUTE};

/// Main intervals below this are "minutes-based" and re-nag quickly.
pub const HOURLY_THRESHOLD_MS: i64 = MILLIS_PER_HOUR;

/// Micro interval for minutes-based reminders.
pub const MICRO_INTERVAL_SHORT_MS: i64 = 2 * MILLIS_PER_MINUTE;

/// Micro interval for hourly-or-slower reminders.
pub const MICRO_INTERVAL_LONG_MS: i64 = 5 * MILLIS_PER_MINUTE;

/// How long a reminder may stay in the micro loop before yielding back
/// to the main cadence.
pub const MICRO_LOOP_TIMEOUT_MS: i64 = 30 * MILLIS_PER_MINUTE;

/// Where a reminder currently sits in the alarm lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NagPhase {
    /// Not currently alarming.
    Idle,
    /// A main-interval alarm fired and the micro loop has not started.
    MainLoop,
    /// Inside the bounded re-nag window.
    MicroLoop { entered_ms: i64 },
}

impl NagPhase {
    /// Phase implied by the persisted row.
    pub fn of(reminder: &Reminder) -> Self {
        if reminder.in_micro_loop {
            match reminder.micro_loop_entered_ms {
                Some(entered_ms) => NagPhase::MicroLoop { entered_ms },
                // Row violates its own invariant; treat entry as unknown.
                None => NagPhase::MainLoop,
            }
        } else if reminder.completed || !reminder.enabled {
            NagPhase::Idle
        } else {
            NagPhase::MainLoop
        }
    }
}

/// Side effects the caller must execute, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Persist the updated row before anything else.
    Persist,
    /// Register the single pending wake-up, replacing any prior one.
    Schedule { fire_at_ms: i64 },
}

/// What a delivered alarm did to the reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// Stale alarm raced a completion; dropped silently.
    IgnoredCompleted,
    /// Alarm for a disabled reminder; dropped the same way.
    IgnoredDisabled,
    /// Alarm for a reminder that no longer exists.
    IgnoredMissing,
    /// A main (or initial) fire entered the micro loop.
    EnteredMicroLoop { next_fire_ms: i64 },
    /// A micro fire inside the 30-minute window; re-nagging.
    ContinuedMicroLoop { next_fire_ms: i64 },
    /// The window closed and the main cadence resumed.
    ResumedMainLoop { next_fire_ms: i64 },
    /// The window closed with no main repetition left; quiet until the
    /// user interacts.
    RepetitionsExhausted,
}

impl FireOutcome {
    /// The wake-up this step asked the scheduler for, if any.
    pub fn next_fire_ms(&self) -> Option<i64> {
        match *self {
            FireOutcome::EnteredMicroLoop { next_fire_ms }
            | FireOutcome::ContinuedMicroLoop { next_fire_ms }
            | FireOutcome::ResumedMainLoop { next_fire_ms } => Some(next_fire_ms),
            _ => None,
        }
    }
}

/// One transition step: updated row plus the effects to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub reminder: Reminder,
    pub effects: Vec<Effect>,
    pub outcome: FireOutcome,
}

impl Step {
    fn unchanged(reminder: &Reminder, outcome: FireOutcome) -> Self {
        Self {
            reminder: reminder.clone(),
            effects: Vec::new(),
            outcome,
        }
    }
}

/// Micro-loop re-nag interval for a reminder with the given main
/// interval. Minutes-based reminders re-nag quickly; hourly-or-slower
/// ones (and reminders without a main interval) can afford the longer
/// snooze.
pub fn micro_interval_ms(main_interval_ms: Option<i64>) -> i64 {
    match main_interval_ms {
        Some(ms) if ms < HOURLY_THRESHOLD_MS => MICRO_INTERVAL_SHORT_MS,
        _ => MICRO_INTERVAL_LONG_MS,
    }
}

/// Advance the machine by one delivered alarm.
///
/// | Phase | Condition | Result |
/// |-------|-----------|--------|
/// | any | completed | no-op (stale alarm) |
/// | any | disabled | no-op |
/// | main | — | enter micro loop, fire again in one micro interval |
/// | micro | elapsed < 30 min | stay, fire again in one micro interval |
/// | micro | elapsed ≥ 30 min, next repetition ahead of `now` | resume main cadence at it |
/// | micro | elapsed ≥ 30 min, none left or already past | leave the loop, schedule nothing |
pub fn on_alarm_fired(reminder: &Reminder, now_ms: i64) -> Step {
    if reminder.completed {
        return Step::unchanged(reminder, FireOutcome::IgnoredCompleted);
    }
    if !reminder.enabled {
        return Step::unchanged(reminder, FireOutcome::IgnoredDisabled);
    }

    if !reminder.in_micro_loop {
        // Main loop (or initial) fire: start pestering.
        let mut updated = reminder.clone();
        updated.in_micro_loop = true;
        updated.micro_loop_entered_ms = Some(now_ms);
        let next_fire_ms = now_ms + micro_interval_ms(reminder.nag_interval_ms);
        return Step {
            reminder: updated,
            effects: vec![
                Effect::Persist,
                Effect::Schedule {
                    fire_at_ms: next_fire_ms,
                },
            ],
            outcome: FireOutcome::EnteredMicroLoop { next_fire_ms },
        };
    }

    // A missing entry timestamp yields elapsed = 0, keeping the loop alive
    // for a full window rather than aborting it.
    let entered_ms = reminder.micro_loop_entered_ms.unwrap_or(now_ms);
    let elapsed_ms = now_ms - entered_ms;

    if elapsed_ms < MICRO_LOOP_TIMEOUT_MS {
        // Still inside the window: re-nag without resetting the entry time.
        let next_fire_ms = now_ms + micro_interval_ms(reminder.nag_interval_ms);
        return Step {
            reminder: reminder.clone(),
            effects: vec![Effect::Schedule {
                fire_at_ms: next_fire_ms,
            }],
            outcome: FireOutcome::ContinuedMicroLoop { next_fire_ms },
        };
    }

    // Window closed: yield back to the main cadence if a repetition is
    // still ahead of us, otherwise go quiet.
    let mut updated = reminder.clone();
    updated.in_micro_loop = false;
    updated.micro_loop_entered_ms = None;

    match reminder.next_main_fire_ms() {
        Some(next_fire_ms) if next_fire_ms > now_ms => {
            updated.repetition_index += 1;
            Step {
                reminder: updated,
                effects: vec![
                    Effect::Persist,
                    Effect::Schedule {
                        fire_at_ms: next_fire_ms,
                    },
                ],
                outcome: FireOutcome::ResumedMainLoop { next_fire_ms },
            }
        }
        _ => Step {
            reminder: updated,
            effects: vec![Effect::Persist],
            outcome: FireOutcome::RepetitionsExhausted,
        },
    }
}
