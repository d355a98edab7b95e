// Pitch names and the frequency lookup table
// 25 keys, two octaves C3..C5, A4 = 440Hz standard tuning

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A key on the virtual keyboard.
///
/// The string form ("C#4") is the wire and persistence form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pitch {
    #[serde(rename = "C3")]
    C3,
    #[serde(rename = "C#3")]
    Cs3,
    #[serde(rename = "D3")]
    D3,
    #[serde(rename = "D#3")]
    Ds3,
    #[serde(rename = "E3")]
    E3,
    #[serde(rename = "F3")]
    F3,
    #[serde(rename = "F#3")]
    Fs3,
    #[serde(rename = "G3")]
    G3,
    #[serde(rename = "G#3")]
    Gs3,
    #[serde(rename = "A3")]
    A3,
    #[serde(rename = "A#3")]
    As3,
    #[serde(rename = "B3")]
    B3,
    #[serde(rename = "C4")]
    C4,
    #[serde(rename = "C#4")]
    Cs4,
    #[serde(rename = "D4")]
    D4,
    #[serde(rename = "D#4")]
    Ds4,
    #[serde(rename = "E4")]
    E4,
    #[serde(rename = "F4")]
    F4,
    #[serde(rename = "F#4")]
    Fs4,
    #[serde(rename = "G4")]
    G4,
    #[serde(rename = "G#4")]
    Gs4,
    #[serde(rename = "A4")]
    A4,
    #[serde(rename = "A#4")]
    As4,
    #[serde(rename = "B4")]
    B4,
    #[serde(rename = "C5")]
    C5,
}

impl Pitch {
    /// All keys in keyboard order, low to high.
    pub const ALL: [Pitch; 25] = [
        Pitch::C3,
        Pitch::Cs3,
        Pitch::D3,
        Pitch::Ds3,
        Pitch::E3,
        Pitch::F3,
        Pitch::Fs3,
        Pitch::G3,
        Pitch::Gs3,
        Pitch::A3,
        Pitch::As3,
        Pitch::B3,
        Pitch::C4,
        Pitch::Cs4,
        Pitch::D4,
        Pitch::Ds4,
        Pitch::E4,
        Pitch::F4,
        Pitch::Fs4,
        Pitch::G4,
        Pitch::Gs4,
        Pitch::A4,
        Pitch::As4,
        Pitch::B4,
        Pitch::C5,
    ];

    /// Note name as displayed on the key (e.g. "C#4").
    pub fn name(&self) -> &'static str {
        match self {
            Pitch::C3 => "C3",
            Pitch::Cs3 => "C#3",
            Pitch::D3 => "D3",
            Pitch::Ds3 => "D#3",
            Pitch::E3 => "E3",
            Pitch::F3 => "F3",
            Pitch::Fs3 => "F#3",
            Pitch::G3 => "G3",
            Pitch::Gs3 => "G#3",
            Pitch::A3 => "A3",
            Pitch::As3 => "A#3",
            Pitch::B3 => "B3",
            Pitch::C4 => "C4",
            Pitch::Cs4 => "C#4",
            Pitch::D4 => "D4",
            Pitch::Ds4 => "D#4",
            Pitch::E4 => "E4",
            Pitch::F4 => "F4",
            Pitch::Fs4 => "F#4",
            Pitch::G4 => "G4",
            Pitch::Gs4 => "G#4",
            Pitch::A4 => "A4",
            Pitch::As4 => "A#4",
            Pitch::B4 => "B4",
            Pitch::C5 => "C5",
        }
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for pitch names outside the 25-key range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pitch name: {0}")]
pub struct UnknownPitch(pub String);

impl FromStr for Pitch {
    type Err = UnknownPitch;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pitch::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| UnknownPitch(s.to_string()))
    }
}

/// Immutable pitch-to-frequency mapping.
///
/// Built once and injected wherever a frequency is needed; there is no
/// global tuning state.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    frequencies: HashMap<Pitch, f32>,
}

impl FrequencyTable {
    /// Equal-temperament tuning with A4 = 440 Hz, values rounded to two
    /// decimals.
    pub fn standard() -> Self {
        const TUNING: [(Pitch, f32); 25] = [
            (Pitch::C3, 130.81),
            (Pitch::Cs3, 138.59),
            (Pitch::D3, 146.83),
            (Pitch::Ds3, 155.56),
            (Pitch::E3, 164.81),
            (Pitch::F3, 174.61),
            (Pitch::Fs3, 185.00),
            (Pitch::G3, 196.00),
            (Pitch::Gs3, 207.65),
            (Pitch::A3, 220.00),
            (Pitch::As3, 233.08),
            (Pitch::B3, 246.94),
            (Pitch::C4, 261.63),
            (Pitch::Cs4, 277.18),
            (Pitch::D4, 293.66),
            (Pitch::Ds4, 311.13),
            (Pitch::E4, 329.63),
            (Pitch::F4, 349.23),
            (Pitch::Fs4, 369.99),
            (Pitch::G4, 392.00),
            (Pitch::Gs4, 415.30),
            (Pitch::A4, 440.00),
            (Pitch::As4, 466.16),
            (Pitch::B4, 493.88),
            (Pitch::C5, 523.25),
        ];

        Self {
            frequencies: TUNING.iter().copied().collect(),
        }
    }

    /// Frequency in Hz for a key.
    pub fn frequency(&self, pitch: Pitch) -> f32 {
        // Every Pitch variant is in the table by construction.
        self.frequencies[&pitch]
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::standard()
    }
}
