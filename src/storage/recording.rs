// Recording - the persisted shape of a saved take

use crate::sequence::NoteEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved recording: numeric id, display name, opaque access token,
/// and the ordered note sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub id: u64,
    pub name: String,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub notes: Vec<NoteEvent>,
}

/// What a successful save hands back to the caller: enough to display
/// ("Saved! Play \"name\"") and to retrieve later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedRecording {
    pub id: u64,
    pub name: String,
    pub token: String,
}
