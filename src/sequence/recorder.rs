// Recorder - captures key presses into a timestamped note sequence

use crate::pitch::Pitch;
use crate::sequence::note::NoteEvent;

/// Captures `(note, offset)` pairs while armed.
///
/// Offsets are wall-clock deltas from the arm instant, so the buffer is
/// monotonic by construction. The recorder never plays sound itself; the
/// live-play path is the caller's job.
pub struct Recorder {
    armed: bool,
    origin_ms: Option<u64>,
    buffer: Vec<NoteEvent>,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            armed: false,
            origin_ms: None,
            buffer: Vec::new(),
        }
    }

    /// Start a fresh take at `now_ms`.
    ///
    /// Arming while already armed re-origins the timeline and discards
    /// the previous buffer.
    pub fn arm(&mut self, now_ms: u64) {
        self.armed = true;
        self.origin_ms = Some(now_ms);
        self.buffer.clear();
    }

    /// Capture a key press. No-op unless armed.
    pub fn note_pressed(&mut self, note: Pitch, now_ms: u64) {
        if !self.armed {
            return;
        }
        let origin = self.origin_ms.unwrap_or(now_ms);
        let offset_ms = now_ms.saturating_sub(origin);
        self.buffer.push(NoteEvent::new(note, offset_ms));
    }

    /// Stop capturing and hand back the take.
    ///
    /// An empty take is valid here; "no notes recorded" is the caller's
    /// message to surface.
    pub fn disarm(&mut self) -> Vec<NoteEvent> {
        self.armed = false;
        self.origin_ms = None;
        std::mem::take(&mut self.buffer)
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn note_count(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}
