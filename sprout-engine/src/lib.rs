//! Sprout engine: reminder scheduling and garden gamification.
//!
//! The core of a personal reminder/habit app, presentation-free. Two
//! subsystems carry the real logic:
//!
//! - [`nag`] — the alarm lifecycle of a reminder: the main repeat
//!   cadence, the bounded micro-snooze loop entered after every fire,
//!   and the midnight cutoff on repetitions.
//! - [`garden`] — the gamification aggregate: day-boundary streaks,
//!   growth stages derived from the cumulative completion count, and
//!   fixed streak milestones.
//!
//! Around them sit the collaborator seams a host app plugs into:
//! [`storage::Store`] for persisted rows, [`alarm::AlarmScheduler`] for
//! one-pending-wake-up-per-reminder scheduling (with a live tokio
//! implementation in [`alarm::AlarmService`]), and the presentation
//! contracts in [`notify`].

pub mod alarm;
pub mod completion;
pub mod error;
pub mod garden;
pub mod nag;
pub mod notify;
pub mod reminder;
pub mod runtime;
pub mod storage;
pub mod tracing;
pub mod types;

pub use completion::CompletionEngine;
pub use error::{Error, Result};
pub use nag::NagDriver;
pub use reminder::{Recurrence, Reminder};
