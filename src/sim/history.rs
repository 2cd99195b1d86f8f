/// Play history: the last 20 quiz results, newest first.
///
/// Stored as one JSON array under a single key. Anything unreadable is
/// treated as "no history yet" so a damaged file never blocks play.

use chrono::{DateTime, Local, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::domain::selection::SelectionMode;
use super::store::KeyValueStore;

pub const HISTORY_KEY: &str = "quiz_records";
pub const MAX_RECORDS: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayRecord {
    pub date: DateTime<Utc>,
    pub mode: SelectionMode,
    pub success: bool,
    pub correct: u32,
    pub total: u32,
}

impl PlayRecord {
    /// `M/D H:MM` in local time, for the start screen table.
    pub fn short_date(&self) -> String {
        self.date.with_timezone(&Local).format("%-m/%-d %-H:%M").to_string()
    }
}

pub struct HistoryLedger<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> HistoryLedger<S> {
    pub fn new(store: S) -> Self {
        HistoryLedger { store }
    }

    /// All records, most recent first. Empty when missing or corrupted.
    pub fn list(&self) -> Vec<PlayRecord> {
        let Some(raw) = self.store.get(HISTORY_KEY) else {
            return vec![];
        };
        match serde_json::from_str::<Vec<PlayRecord>>(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("play history unreadable, starting fresh: {e}");
                vec![]
            }
        }
    }

    /// Put `record` first and keep the newest 20.
    pub fn append(&mut self, record: PlayRecord) {
        let mut records = self.list();
        records.insert(0, record);
        records.truncate(MAX_RECORDS);

        let result = serde_json::to_string(&records)
            .map_err(std::io::Error::from)
            .and_then(|json| self.store.set(HISTORY_KEY, &json));
        if let Err(e) = result {
            warn!("could not save play history: {e}");
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
