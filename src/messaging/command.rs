// Command types - session/UI to audio callback

use crate::pitch::Pitch;

#[derive(Debug, Clone, Copy)]
pub enum Command {
    /// Live key down: start a held voice
    Press(Pitch),
    /// Live key up: early-release the held voice
    Release(Pitch),
    /// Scheduled playback note with its sustain duration
    Trigger { note: Pitch, duration_ms: u64 },
    /// Silence every voice immediately
    StopAll,
    SetVolume(f32),
}
