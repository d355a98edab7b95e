// Key voice - two superimposed oscillators behind one envelope
//
// A piano-ish tone: triangle at the key frequency plus a quieter sine
// one octave up, detuned a few cents for richness. A voice is either
// held (live key, released by the player) or timed (scheduled playback,
// releases itself after its duration and decays naturally).

use super::envelope::KeyEnvelope;
use super::oscillator::{SimpleOscillator, WaveformType};
use crate::pitch::Pitch;

/// Peak gain of the primary tone.
const PRIMARY_GAIN: f32 = 0.4;
/// Peak gain of the octave shimmer (a quarter of the primary).
const SHIMMER_GAIN: f32 = 0.1;
/// Detuning of the shimmer tone, in cents.
const DETUNE_CENTS: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VoiceMode {
    /// Live key: sounds until `release_early`
    Held,
    /// Scheduled note: sustain counts down, then the release ramp runs
    Timed { hold_remaining: u64 },
}

pub struct KeyVoice {
    primary: SimpleOscillator,
    shimmer: SimpleOscillator,
    envelope: KeyEnvelope,
    pitch: Option<Pitch>,
    mode: VoiceMode,
    sample_rate: f32,
    /// Allocation age for voice stealing (higher = newer)
    age: u64,
}

impl KeyVoice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            primary: SimpleOscillator::new(WaveformType::Triangle, sample_rate),
            shimmer: SimpleOscillator::new(WaveformType::Sine, sample_rate),
            envelope: KeyEnvelope::new(sample_rate),
            pitch: None,
            mode: VoiceMode::Held,
            sample_rate,
            age: 0,
        }
    }

    /// Start sounding a live key; it rings until `release_early`.
    pub fn start_held(&mut self, pitch: Pitch, frequency: f32, age: u64) {
        self.start(pitch, frequency, VoiceMode::Held, age);
    }

    /// Start a scheduled note that releases itself after `duration_ms`.
    pub fn start_timed(&mut self, pitch: Pitch, frequency: f32, duration_ms: u64, age: u64) {
        let hold_remaining = (duration_ms as f32 / 1000.0 * self.sample_rate) as u64;
        self.start(pitch, frequency, VoiceMode::Timed { hold_remaining }, age);
    }

    fn start(&mut self, pitch: Pitch, frequency: f32, mode: VoiceMode, age: u64) {
        self.pitch = Some(pitch);
        self.mode = mode;
        self.age = age;

        self.primary.set_frequency(frequency);
        self.primary.reset();
        // Octave up, nudged sharp by a few cents
        let detune = 2.0_f32.powf(DETUNE_CENTS / 1200.0);
        self.shimmer.set_frequency(frequency * 2.0 * detune);
        self.shimmer.reset();

        self.envelope.note_on();
    }

    /// Key lifted before the natural duration: begin the release ramp
    /// from the current amplitude.
    pub fn release_early(&mut self) {
        self.mode = VoiceMode::Held;
        self.envelope.release();
    }

    pub fn next_sample(&mut self) -> f32 {
        if !self.envelope.is_active() {
            return 0.0;
        }

        if let VoiceMode::Timed { hold_remaining } = &mut self.mode {
            if *hold_remaining > 0 {
                *hold_remaining -= 1;
            } else {
                self.envelope.release();
            }
        }

        let amplitude = self.envelope.process();
        self.primary.next_sample() * PRIMARY_GAIN * amplitude
            + self.shimmer.next_sample() * SHIMMER_GAIN * amplitude
    }

    pub fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    pub fn is_releasing(&self) -> bool {
        self.envelope.is_releasing()
    }

    /// Still a live key holding sustain (press de-dup looks at this).
    pub fn is_held(&self) -> bool {
        self.is_active() && self.mode == VoiceMode::Held && !self.envelope.is_releasing()
    }

    pub fn pitch(&self) -> Option<Pitch> {
        self.pitch
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn silence(&mut self) {
        self.envelope.reset();
        self.pitch = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::envelope::RELEASE_SECONDS;

    const SAMPLE_RATE: f32 = 48000.0;

    #[test]
    fn test_timed_voice_decays_after_duration() {
        let mut voice = KeyVoice::new(SAMPLE_RATE);
        voice.start_timed(Pitch::C4, 261.63, 200, 1);

        // Sustain window plus full release, with some slack
        let total =
            ((0.2 + RELEASE_SECONDS) * SAMPLE_RATE) as usize + 2000;
        for _ in 0..total {
            voice.next_sample();
        }
        assert!(!voice.is_active());
    }

    #[test]
    fn test_held_voice_rings_until_released() {
        let mut voice = KeyVoice::new(SAMPLE_RATE);
        voice.start_held(Pitch::A4, 440.0, 1);

        for _ in 0..(SAMPLE_RATE as usize) {
            voice.next_sample();
        }
        assert!(voice.is_active());
        assert!(voice.is_held());

        voice.release_early();
        assert!(!voice.is_held());
        for _ in 0..((RELEASE_SECONDS * SAMPLE_RATE) as usize + 100) {
            voice.next_sample();
        }
        assert!(!voice.is_active());
    }

    #[test]
    fn test_output_is_bounded() {
        let mut voice = KeyVoice::new(SAMPLE_RATE);
        voice.start_held(Pitch::C5, 523.25, 1);
        for _ in 0..20_000 {
            let sample = voice.next_sample();
            assert!(sample.abs() <= PRIMARY_GAIN + SHIMMER_GAIN + 0.001);
        }
    }

    #[test]
    fn test_silence_kills_voice() {
        let mut voice = KeyVoice::new(SAMPLE_RATE);
        voice.start_held(Pitch::C4, 261.63, 1);
        voice.silence();
        assert!(!voice.is_active());
        assert_eq!(voice.pitch(), None);
    }
}
