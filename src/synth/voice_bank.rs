// Voice bank - allocation and mixing, one live voice per pitch
//
// The live-play rule: at most one held voice per pitch, so a repeated
// keydown for a key that is still sounding is a no-op. Scheduled
// playback voices are not deduplicated; each scheduled note gets its
// own voice and completes its own envelope.

use super::voice::KeyVoice;
use crate::pitch::Pitch;

const MAX_VOICES: usize = 16;

pub struct VoiceBank {
    voices: [KeyVoice; MAX_VOICES],
    /// Incremented per allocation; used for steal priority
    age_counter: u64,
}

impl VoiceBank {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            voices: std::array::from_fn(|_| KeyVoice::new(sample_rate)),
            age_counter: 0,
        }
    }

    /// Live key pressed. No-op while a held voice for this pitch is
    /// still sounding its sustain.
    pub fn press(&mut self, pitch: Pitch, frequency: f32) {
        if self
            .voices
            .iter()
            .any(|v| v.is_held() && v.pitch() == Some(pitch))
        {
            return;
        }

        self.age_counter = self.age_counter.wrapping_add(1);
        let age = self.age_counter;
        let slot = self.allocate();
        self.voices[slot].start_held(pitch, frequency, age);
    }

    /// Live key lifted: early-release its voice.
    pub fn release(&mut self, pitch: Pitch) {
        for voice in &mut self.voices {
            if voice.is_held() && voice.pitch() == Some(pitch) {
                voice.release_early();
            }
        }
    }

    /// Scheduled playback note: sounds for `duration_ms` then decays.
    pub fn trigger(&mut self, pitch: Pitch, frequency: f32, duration_ms: u64) {
        self.age_counter = self.age_counter.wrapping_add(1);
        let age = self.age_counter;
        let slot = self.allocate();
        self.voices[slot].start_timed(pitch, frequency, duration_ms, age);
    }

    pub fn stop_all(&mut self) {
        for voice in &mut self.voices {
            voice.silence();
        }
    }

    /// Mix of all sounding voices for one output sample.
    pub fn next_sample(&mut self) -> f32 {
        self.voices.iter_mut().map(|v| v.next_sample()).sum::<f32>() / 4.0
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    fn allocate(&mut self) -> usize {
        if let Some(index) = self.voices.iter().position(|v| !v.is_active()) {
            return index;
        }
        self.find_voice_to_steal()
    }

    /// Steal a releasing voice first (already fading, least audible),
    /// otherwise the oldest allocation.
    fn find_voice_to_steal(&self) -> usize {
        let mut best_index = 0;
        let mut best = (false, u64::MAX);

        for (index, voice) in self.voices.iter().enumerate() {
            let candidate = (voice.is_releasing(), voice.age());
            let better = if candidate.0 != best.0 {
                candidate.0
            } else {
                candidate.1 < best.1
            };
            if better {
                best = candidate;
                best_index = index;
            }
        }

        best_index
    }
}
