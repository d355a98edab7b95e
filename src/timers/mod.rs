// Timers module - cancelable deferred triggers behind a driver trait
//
// Playback timing never blocks: "waiting" for a note's due time is a
// deferred callback on whichever driver is plugged in (real worker
// thread, or a virtual clock in tests).

pub mod driver;
pub mod manual;
pub mod thread;

pub use driver::{TimerCallback, TimerDriver, TimerId};
pub use manual::ManualTimerDriver;
pub use thread::ThreadTimerDriver;
