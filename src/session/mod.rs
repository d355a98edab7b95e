// Session module - the facade tying recorder, playback and storage together

pub mod facade;
pub mod lights;
pub mod sink;

pub use facade::{KeyboardSession, SessionError};
pub use lights::{KeyLights, LightToken};
pub use sink::EngineSink;
