// Clavier - Library exports for tests and the demo binary

pub mod audio;
pub mod messaging;
pub mod pitch;
pub mod playback;
pub mod sequence;
pub mod session;
pub mod storage;
pub mod synth;
pub mod timers;

// Re-export commonly used types for convenience
pub use audio::{AudioEngine, AudioError};
pub use messaging::{Command, Notification, create_command_channel, create_notification_channel};
pub use pitch::{FrequencyTable, Pitch};
pub use playback::{
    PlaybackError, PlaybackScheduler, PlaybackSink, PlaybackStatus, RELEASE_TAIL_MS,
};
pub use sequence::{DEFAULT_NOTE_DURATION_MS, NoteEvent, Recorder};
pub use session::{KeyboardSession, SessionError};
pub use storage::{JsonFileStore, MemoryStore, Recording, RecordingStore, StorageError};
pub use timers::{ManualTimerDriver, ThreadTimerDriver, TimerDriver, TimerId};
