// Playback module - the timed replay state machine and its output seam

pub mod scheduler;
pub mod sink;

pub use scheduler::{PlaybackError, PlaybackScheduler, PlaybackStatus, RELEASE_TAIL_MS};
pub use sink::PlaybackSink;
