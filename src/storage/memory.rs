// In-memory store - token-keyed map, useful for tests and demos

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use super::recording::{Recording, SavedRecording};
use super::store::{RecordingStore, StorageError, new_token, ordered_notes, resolve_name};
use crate::sequence::NoteEvent;

/// Keeps every saved recording in a token-keyed map. Ids start at 1 and
/// count up for the lifetime of the store.
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

struct MemoryInner {
    next_id: u64,
    recordings: HashMap<String, Recording>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                next_id: 1,
                recordings: HashMap::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(inner) => inner.recordings.len(),
            Err(poisoned) => poisoned.into_inner().recordings.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingStore for MemoryStore {
    fn save(&self, name: Option<&str>, notes: &[NoteEvent]) -> Result<SavedRecording, StorageError> {
        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };

        let id = inner.next_id;
        inner.next_id += 1;

        let recording = Recording {
            id,
            name: resolve_name(name, id),
            access_token: new_token(),
            created_at: Utc::now(),
            notes: ordered_notes(notes),
        };

        let saved = SavedRecording {
            id,
            name: recording.name.clone(),
            token: recording.access_token.clone(),
        };
        inner.recordings.insert(recording.access_token.clone(), recording);

        Ok(saved)
    }

    fn load(&self, token: &str) -> Result<Recording, StorageError> {
        let inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };

        inner
            .recordings
            .get(token)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(token.to_string()))
    }
}
