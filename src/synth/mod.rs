// Synth module - oscillators, envelopes, voices

pub mod envelope;
pub mod oscillator;
pub mod voice;
pub mod voice_bank;

pub use envelope::KeyEnvelope;
pub use oscillator::{SimpleOscillator, WaveformType};
pub use voice::KeyVoice;
pub use voice_bank::VoiceBank;
