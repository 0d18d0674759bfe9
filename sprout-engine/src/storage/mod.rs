//! Storage contract for engine state.
//!
//! The engine persists two kinds of rows: reminders keyed by id, and the
//! singleton garden row. Implementations must make each row operation
//! atomic (a reader sees a row entirely before or entirely after a
//! write), which both bundled stores get from a single interior lock.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::garden::GardenState;
use crate::reminder::Reminder;

#[async_trait]
pub trait Store: Send + Sync {
    /// Assign an id (when the reminder is transient) and persist the row.
    async fn create_reminder(&self, reminder: &mut Reminder) -> Result<i64>;

    async fn load_reminder(&self, id: i64) -> Result<Option<Reminder>>;

    /// Upsert the row under its id.
    async fn save_reminder(&self, reminder: &Reminder) -> Result<()>;

    /// Remove the row. Removing an absent row is not an error.
    async fn delete_reminder(&self, id: i64) -> Result<()>;

    /// The singleton garden row, if it was ever written.
    async fn load_garden(&self) -> Result<Option<GardenState>>;

    async fn save_garden(&self, garden: &GardenState) -> Result<()>;
}
