// JSON file store - one file per recording plus a small catalog

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::recording::{Recording, SavedRecording};
use super::store::{RecordingStore, StorageError, new_token, ordered_notes, resolve_name};
use crate::sequence::NoteEvent;

/// Persists recordings as `{token}.json` files in a directory, with a
/// `catalog.json` alongside holding the id counter.
pub struct JsonFileStore {
    dir: PathBuf,
    catalog: Mutex<Catalog>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Catalog {
    next_id: u64,
}

impl JsonFileStore {
    /// Open (or create) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let catalog_path = dir.join("catalog.json");
        let catalog = if catalog_path.exists() {
            let contents = fs::read_to_string(&catalog_path)?;
            serde_json::from_str(&contents)?
        } else {
            Catalog { next_id: 1 }
        };

        Ok(Self {
            dir,
            catalog: Mutex::new(catalog),
        })
    }

    /// Platform data directory, e.g. `~/.local/share/clavier/recordings`.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clavier")
            .join("recordings")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn recording_path(&self, token: &str) -> PathBuf {
        self.dir.join(format!("{}.json", token))
    }

    fn write_catalog(&self, catalog: &Catalog) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(catalog)?;
        fs::write(self.dir.join("catalog.json"), json)?;
        Ok(())
    }

    // Tokens come straight from user input on load; only alphanumeric
    // names ever get written, so anything else cannot exist on disk.
    fn token_is_wellformed(token: &str) -> bool {
        !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric())
    }
}

impl RecordingStore for JsonFileStore {
    fn save(&self, name: Option<&str>, notes: &[NoteEvent]) -> Result<SavedRecording, StorageError> {
        let mut catalog = match self.catalog.lock() {
            Ok(catalog) => catalog,
            Err(poisoned) => poisoned.into_inner(),
        };

        let id = catalog.next_id;
        let recording = Recording {
            id,
            name: resolve_name(name, id),
            access_token: new_token(),
            created_at: Utc::now(),
            notes: ordered_notes(notes),
        };

        let json = serde_json::to_string_pretty(&recording)?;
        fs::write(self.recording_path(&recording.access_token), json)?;

        catalog.next_id += 1;
        self.write_catalog(&catalog)?;

        Ok(SavedRecording {
            id,
            name: recording.name,
            token: recording.access_token,
        })
    }

    fn load(&self, token: &str) -> Result<Recording, StorageError> {
        if !Self::token_is_wellformed(token) {
            return Err(StorageError::NotFound(token.to_string()));
        }

        let path = self.recording_path(token);
        if !path.exists() {
            return Err(StorageError::NotFound(token.to_string()));
        }

        let contents = fs::read_to_string(path)?;
        let mut recording: Recording = serde_json::from_str(&contents)?;
        recording.notes = ordered_notes(&recording.notes);
        Ok(recording)
    }
}
