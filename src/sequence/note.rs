// Note event - one captured key press with its timeline offset

use crate::pitch::Pitch;
use serde::{Deserialize, Serialize};

/// Sound length used when a stored note carries no explicit duration.
pub const DEFAULT_NOTE_DURATION_MS: u64 = 200;

/// A note on the recording timeline.
///
/// `offset_ms` is measured from the start of the recording (the arm
/// instant, not the first key press - leading silence is part of the
/// take). The wire and persisted shape is `{note, ms, duration?}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Which key was pressed
    pub note: Pitch,

    /// Milliseconds since the recording started
    #[serde(rename = "ms")]
    pub offset_ms: u64,

    /// How long the note sounds during playback
    #[serde(rename = "duration", default = "default_duration")]
    pub duration_ms: u64,
}

fn default_duration() -> u64 {
    DEFAULT_NOTE_DURATION_MS
}

impl NoteEvent {
    /// Create a note with the default playback duration.
    pub fn new(note: Pitch, offset_ms: u64) -> Self {
        Self {
            note,
            offset_ms,
            duration_ms: DEFAULT_NOTE_DURATION_MS,
        }
    }

    pub fn with_duration(note: Pitch, offset_ms: u64, duration_ms: u64) -> Self {
        debug_assert!(duration_ms > 0, "note duration must be positive");
        Self {
            note,
            offset_ms,
            duration_ms,
        }
    }

    /// Timeline position at which the sustain portion ends.
    pub fn end_ms(&self) -> u64 {
        self.offset_ms + self.duration_ms
    }
}

/// Check that a stored sequence is ordered by non-decreasing offset.
pub fn is_ordered(notes: &[NoteEvent]) -> bool {
    notes.windows(2).all(|w| w[0].offset_ms <= w[1].offset_ms)
}
