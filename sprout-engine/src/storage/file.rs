//! JSON-document store for a single-user installation.
//!
//! The whole database is one JSON document, rewritten on every mutation
//! via a temp file and an atomic rename, so a crash mid-write leaves the
//! previous document intact. Row-level atomicity comes from the interior
//! lock, same as [`super::MemoryStore`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::garden::GardenState;
use crate::reminder::Reminder;

use super::Store;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    next_reminder_id: i64,
    reminders: BTreeMap<i64, Reminder>,
    garden: Option<GardenState>,
}

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    document: Mutex<Document>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading the existing document or
    /// starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Document::default(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, document: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(document)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn create_reminder(&self, reminder: &mut Reminder) -> Result<i64> {
        let mut document = self.document.lock();
        if reminder.id <= 0 {
            document.next_reminder_id += 1;
            reminder.id = document.next_reminder_id;
        } else {
            document.next_reminder_id = document.next_reminder_id.max(reminder.id);
        }
        document.reminders.insert(reminder.id, reminder.clone());
        self.flush(&document)?;
        Ok(reminder.id)
    }

    async fn load_reminder(&self, id: i64) -> Result<Option<Reminder>> {
        Ok(self.document.lock().reminders.get(&id).cloned())
    }

    async fn save_reminder(&self, reminder: &Reminder) -> Result<()> {
        let mut document = self.document.lock();
        document.reminders.insert(reminder.id, reminder.clone());
        self.flush(&document)
    }

    async fn delete_reminder(&self, id: i64) -> Result<()> {
        let mut document = self.document.lock();
        document.reminders.remove(&id);
        self.flush(&document)
    }

    async fn load_garden(&self) -> Result<Option<GardenState>> {
        Ok(self.document.lock().garden.clone())
    }

    async fn save_garden(&self, garden: &GardenState) -> Result<()> {
        let mut document = self.document.lock();
        document.garden = Some(garden.clone());
        self.flush(&document)
    }
}
