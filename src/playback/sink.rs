// Playback sink - where scheduled notes land (sound + key indicators)

use crate::pitch::Pitch;

/// Receives the observable effects of a playback session.
///
/// One implementation drives the audio engine and key indicators; tests
/// plug in collectors.
pub trait PlaybackSink: Send + Sync {
    /// A scheduled note came due: sound it and light its key for
    /// `duration_ms`.
    fn note_triggered(&self, note: Pitch, duration_ms: u64);

    /// The session was stopped: darken every key indicator, whichever
    /// were lit.
    fn keys_cleared(&self);

    /// The last note's sound fully decayed.
    fn finished(&self);
}
