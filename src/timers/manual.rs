// Manual timer driver - virtual clock for deterministic timing tests

use super::driver::{TimerCallback, TimerDriver, TimerId};
use std::sync::Mutex;

struct Queue {
    now_ms: u64,
    next_seq: u64,
    pending: std::collections::BTreeMap<(u64, u64), TimerCallback>,
}

/// Timer driver whose clock only moves when told to.
///
/// `advance_ms` fires every trigger that comes due, in deadline order
/// (schedule order at equal deadlines), with the clock set to each
/// trigger's own due time while its callback runs. Callbacks may schedule
/// further triggers; those fire too if they fall inside the advance.
pub struct ManualTimerDriver {
    queue: Mutex<Queue>,
}

impl ManualTimerDriver {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(Queue {
                now_ms: 0,
                next_seq: 0,
                pending: std::collections::BTreeMap::new(),
            }),
        }
    }

    /// Move the clock forward, firing everything that comes due.
    pub fn advance_ms(&self, delta_ms: u64) {
        let target = {
            let queue = self.queue.lock().unwrap();
            queue.now_ms + delta_ms
        };

        loop {
            // Take the next due trigger without holding the lock during
            // the callback, so callbacks can schedule and cancel freely.
            let next = {
                let mut queue = self.queue.lock().unwrap();
                match queue.pending.keys().next().copied() {
                    Some(key) if key.0 <= target => {
                        queue.now_ms = key.0;
                        let callback = queue.pending.remove(&key).unwrap();
                        Some(callback)
                    }
                    _ => {
                        queue.now_ms = target;
                        None
                    }
                }
            };

            match next {
                Some(callback) => callback(),
                None => break,
            }
        }
    }

    /// Number of triggers currently armed.
    pub fn pending_count(&self) -> usize {
        self.queue.lock().unwrap().pending.len()
    }
}

impl TimerDriver for ManualTimerDriver {
    fn now_ms(&self) -> u64 {
        self.queue.lock().unwrap().now_ms
    }

    fn schedule(&self, delay_ms: u64, callback: TimerCallback) -> TimerId {
        let mut queue = self.queue.lock().unwrap();
        let seq = queue.next_seq;
        queue.next_seq += 1;
        let due = queue.now_ms + delay_ms;
        queue.pending.insert((due, seq), callback);
        TimerId(seq)
    }

    fn cancel(&self, id: TimerId) {
        let mut queue = self.queue.lock().unwrap();
        if let Some(key) = queue.pending.keys().copied().find(|(_, seq)| *seq == id.0) {
            queue.pending.remove(&key);
        }
    }
}

impl Default for ManualTimerDriver {
    fn default() -> Self {
        Self::new()
    }
}
