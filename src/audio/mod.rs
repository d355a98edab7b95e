// Audio module - CPAL output

pub mod engine;

pub use engine::{AudioEngine, AudioError};
