// Thread-backed timer driver - a delay queue serviced by one worker

use super::driver::{TimerCallback, TimerDriver, TimerId};
use std::collections::BTreeMap;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

struct Queue {
    // Keyed by (due_ms, seq) so equal deadlines keep schedule order
    pending: BTreeMap<(u64, u64), TimerCallback>,
    next_seq: u64,
    shutdown: bool,
}

struct Shared {
    queue: Mutex<Queue>,
    wakeup: Condvar,
    start: Instant,
}

impl Shared {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Real-time timer driver backed by a single worker thread.
///
/// Callbacks run on the worker thread, one at a time, with no queue lock
/// held - a callback may freely schedule or cancel other triggers.
pub struct ThreadTimerDriver {
    shared: Arc<Shared>,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl ThreadTimerDriver {
    pub fn new() -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue {
                pending: BTreeMap::new(),
                next_seq: 0,
                shutdown: false,
            }),
            wakeup: Condvar::new(),
            start: Instant::now(),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("clavier-timers".to_string())
            .spawn(move || run_worker(worker_shared))
            .expect("failed to spawn timer thread");

        Self {
            shared,
            worker: Some(worker),
        }
    }
}

fn run_worker(shared: Arc<Shared>) {
    let mut queue = shared.queue.lock().unwrap();
    loop {
        if queue.shutdown {
            return;
        }

        let now = shared.now_ms();
        match queue.pending.keys().next().copied() {
            None => {
                queue = shared.wakeup.wait(queue).unwrap();
            }
            Some(key) if key.0 <= now => {
                let callback = queue.pending.remove(&key).unwrap();
                drop(queue);
                callback();
                queue = shared.queue.lock().unwrap();
            }
            Some(key) => {
                let wait = Duration::from_millis(key.0 - now);
                let (guard, _) = shared.wakeup.wait_timeout(queue, wait).unwrap();
                queue = guard;
            }
        }
    }
}

impl TimerDriver for ThreadTimerDriver {
    fn now_ms(&self) -> u64 {
        self.shared.now_ms()
    }

    fn schedule(&self, delay_ms: u64, callback: TimerCallback) -> TimerId {
        let mut queue = self.shared.queue.lock().unwrap();
        let seq = queue.next_seq;
        queue.next_seq += 1;
        let due = self.shared.now_ms() + delay_ms;
        queue.pending.insert((due, seq), callback);
        self.shared.wakeup.notify_one();
        TimerId(seq)
    }

    fn cancel(&self, id: TimerId) {
        let mut queue = self.shared.queue.lock().unwrap();
        if let Some(key) = queue.pending.keys().copied().find(|(_, seq)| *seq == id.0) {
            queue.pending.remove(&key);
        }
    }
}

impl Default for ThreadTimerDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ThreadTimerDriver {
    fn drop(&mut self) {
        {
            let mut queue = self.shared.queue.lock().unwrap();
            queue.shutdown = true;
            queue.pending.clear();
        }
        self.wakeup_and_join();
    }
}

impl ThreadTimerDriver {
    fn wakeup_and_join(&mut self) {
        self.shared.wakeup.notify_one();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
