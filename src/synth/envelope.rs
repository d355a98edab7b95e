// Key envelope - attack / decay-to-sustain / hold / exponential release
//
// Shape of one piano key, normalized to peak 1.0: linear rise over a
// short attack window, decay to half-peak sustain, hold until released,
// then an exponential ramp to near-silence. Release always starts from
// whatever the current amplitude is - never from a reset value - so an
// early release and a natural one are equally click-free.

/// Attack window (linear rise to peak).
pub const ATTACK_SECONDS: f32 = 0.01;
/// Decay window (peak down to sustain); sustain is reached 300 ms in.
pub const DECAY_SECONDS: f32 = 0.29;
/// Sustain amplitude relative to peak.
pub const SUSTAIN_LEVEL: f32 = 0.5;
/// Release window (exponential ramp to the floor).
pub const RELEASE_SECONDS: f32 = 0.3;

// Amplitude considered silence; also the release ramp target factor.
const FLOOR: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

pub struct KeyEnvelope {
    stage: Stage,
    value: f32,
    attack_start: f32,
    stage_sample: f32,
    attack_samples: f32,
    decay_samples: f32,
    release_samples: f32,
    decay_coef: f32,
    release_coef: f32,
}

impl KeyEnvelope {
    pub fn new(sample_rate: f32) -> Self {
        let attack_samples = ATTACK_SECONDS * sample_rate;
        let decay_samples = DECAY_SECONDS * sample_rate;
        let release_samples = RELEASE_SECONDS * sample_rate;

        Self {
            stage: Stage::Idle,
            value: 0.0,
            attack_start: 0.0,
            stage_sample: 0.0,
            attack_samples,
            decay_samples,
            release_samples,
            // Per-sample multipliers for the exponential ramps
            decay_coef: SUSTAIN_LEVEL.powf(1.0 / decay_samples),
            release_coef: FLOOR.powf(1.0 / release_samples),
        }
    }

    /// Start the attack. Rises from the current amplitude, so a voice
    /// reused mid-decay does not click.
    pub fn note_on(&mut self) {
        self.stage = Stage::Attack;
        self.attack_start = self.value;
        self.stage_sample = 0.0;
    }

    /// Begin the release ramp from the current amplitude.
    ///
    /// Called both on natural completion (hold elapsed) and on early
    /// stop (live key lifted before the duration); the two are
    /// indistinguishable from here on.
    pub fn release(&mut self) {
        if self.stage != Stage::Idle && self.stage != Stage::Release {
            self.stage = Stage::Release;
            self.stage_sample = 0.0;
        }
    }

    /// Advance one sample and return the amplitude.
    pub fn process(&mut self) -> f32 {
        match self.stage {
            Stage::Idle => {
                self.value = 0.0;
            }
            Stage::Attack => {
                if self.attack_samples > 0.0 {
                    let progress = (self.stage_sample / self.attack_samples).min(1.0);
                    self.value = self.attack_start + (1.0 - self.attack_start) * progress;
                    self.stage_sample += 1.0;
                    if self.stage_sample >= self.attack_samples {
                        self.stage = Stage::Decay;
                        self.stage_sample = 0.0;
                        self.value = 1.0;
                    }
                } else {
                    self.value = 1.0;
                    self.stage = Stage::Decay;
                    self.stage_sample = 0.0;
                }
            }
            Stage::Decay => {
                self.value *= self.decay_coef;
                self.stage_sample += 1.0;
                if self.stage_sample >= self.decay_samples || self.value <= SUSTAIN_LEVEL {
                    self.stage = Stage::Sustain;
                    self.value = SUSTAIN_LEVEL;
                }
            }
            Stage::Sustain => {
                self.value = SUSTAIN_LEVEL;
            }
            Stage::Release => {
                self.value *= self.release_coef;
                self.stage_sample += 1.0;
                if self.stage_sample >= self.release_samples || self.value <= FLOOR {
                    self.stage = Stage::Idle;
                    self.value = 0.0;
                }
            }
        }

        self.value
    }

    pub fn is_active(&self) -> bool {
        self.stage != Stage::Idle
    }

    pub fn is_releasing(&self) -> bool {
        self.stage == Stage::Release
    }

    pub fn current_value(&self) -> f32 {
        self.value
    }

    pub fn reset(&mut self) {
        self.stage = Stage::Idle;
        self.value = 0.0;
        self.stage_sample = 0.0;
    }
}
