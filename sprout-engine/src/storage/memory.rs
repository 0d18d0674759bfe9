//! In-memory store, the default for tests and the simulator.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::Result;
use crate::garden::GardenState;
use crate::reminder::Reminder;

use super::Store;

#[derive(Debug, Default)]
struct Inner {
    next_reminder_id: i64,
    reminders: BTreeMap<i64, Reminder>,
    garden: Option<GardenState>,
}

/// Rows behind one lock; every trait method is a single critical
/// section, which is what makes each row read-modify-write atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_reminder(&self, reminder: &mut Reminder) -> Result<i64> {
        let mut inner = self.inner.lock();
        if reminder.id <= 0 {
            inner.next_reminder_id += 1;
            reminder.id = inner.next_reminder_id;
        } else {
            inner.next_reminder_id = inner.next_reminder_id.max(reminder.id);
        }
        inner.reminders.insert(reminder.id, reminder.clone());
        Ok(reminder.id)
    }

    async fn load_reminder(&self, id: i64) -> Result<Option<Reminder>> {
        Ok(self.inner.lock().reminders.get(&id).cloned())
    }

    async fn save_reminder(&self, reminder: &Reminder) -> Result<()> {
        self.inner
            .lock()
            .reminders
            .insert(reminder.id, reminder.clone());
        Ok(())
    }

    async fn delete_reminder(&self, id: i64) -> Result<()> {
        self.inner.lock().reminders.remove(&id);
        Ok(())
    }

    async fn load_garden(&self) -> Result<Option<GardenState>> {
        Ok(self.inner.lock().garden.clone())
    }

    async fn save_garden(&self, garden: &GardenState) -> Result<()> {
        self.inner.lock().garden = Some(garden.clone());
        Ok(())
    }
}
