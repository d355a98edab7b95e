// Sequence module - note events and the recorder that captures them

pub mod note;
pub mod recorder;

pub use note::{DEFAULT_NOTE_DURATION_MS, NoteEvent, is_ordered};
pub use recorder::Recorder;
