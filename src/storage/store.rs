// Recording store trait and shared helpers

use super::recording::{Recording, SavedRecording};
use crate::sequence::NoteEvent;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("no recording found for token {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistence collaborator for recordings.
///
/// `save` assigns a numeric id and an opaque token; `load` retrieves by
/// token with notes ordered by offset. Implementations own name
/// defaulting ("Recording {id}" for blank names).
pub trait RecordingStore: Send + Sync {
    fn save(&self, name: Option<&str>, notes: &[NoteEvent]) -> Result<SavedRecording, StorageError>;
    fn load(&self, token: &str) -> Result<Recording, StorageError>;
}

/// Blank or missing names fall back to "Recording {id}".
pub(crate) fn resolve_name(name: Option<&str>, id: u64) -> String {
    match name.map(str::trim) {
        Some(given) if !given.is_empty() => given.to_string(),
        _ => format!("Recording {}", id),
    }
}

/// Fresh opaque access token.
pub(crate) fn new_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Stable sort by offset; capture order breaks ties.
pub(crate) fn ordered_notes(notes: &[NoteEvent]) -> Vec<NoteEvent> {
    let mut sorted = notes.to_vec();
    sorted.sort_by_key(|n| n.offset_ms);
    sorted
}
