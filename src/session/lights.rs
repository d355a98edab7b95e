// Key lights - which keys are currently highlighted

use std::collections::HashMap;
use std::sync::Mutex;

use crate::pitch::Pitch;

/// Token handed out when a key lights up; a timed darken only takes
/// effect while its token is still current, so a key re-lit by a newer
/// trigger is not darkened early by a stale timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightToken(u64);

/// Tracks the lit keys of the on-screen keyboard.
pub struct KeyLights {
    inner: Mutex<LightsInner>,
}

struct LightsInner {
    lit: HashMap<Pitch, u64>,
    next_token: u64,
}

impl KeyLights {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LightsInner {
                lit: HashMap::new(),
                next_token: 0,
            }),
        }
    }

    pub fn light(&self, pitch: Pitch) -> LightToken {
        let mut inner = self.inner.lock().unwrap();
        let token = inner.next_token;
        inner.next_token += 1;
        inner.lit.insert(pitch, token);
        LightToken(token)
    }

    /// Darken `pitch` only if `token` is still its current light.
    pub fn darken_if_current(&self, pitch: Pitch, token: LightToken) {
        let mut inner = self.inner.lock().unwrap();
        if inner.lit.get(&pitch) == Some(&token.0) {
            inner.lit.remove(&pitch);
        }
    }

    /// Darken `pitch` unconditionally (key release).
    pub fn darken(&self, pitch: Pitch) {
        self.inner.lock().unwrap().lit.remove(&pitch);
    }

    pub fn clear_all(&self) {
        self.inner.lock().unwrap().lit.clear();
    }

    pub fn is_lit(&self, pitch: Pitch) -> bool {
        self.inner.lock().unwrap().lit.contains_key(&pitch)
    }

    pub fn lit_keys(&self) -> Vec<Pitch> {
        let mut keys: Vec<Pitch> = self.inner.lock().unwrap().lit.keys().copied().collect();
        keys.sort_by_key(|p| *p as u8);
        keys
    }
}

impl Default for KeyLights {
    fn default() -> Self {
        Self::new()
    }
}
