// Timer driver trait - cancelable single-shot deferred triggers

/// Callback fired when a deferred trigger comes due.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Handle for a scheduled trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Source of time and single-shot deferred triggers.
///
/// Triggers scheduled with the same delay fire in schedule order.
/// `cancel` is best-effort: a callback that already fired cannot be
/// recalled, so consumers must additionally guard fired callbacks with
/// their own state checks.
pub trait TimerDriver: Send + Sync {
    /// Milliseconds on the driver's monotonic clock.
    fn now_ms(&self) -> u64;

    /// Arm a single-shot trigger `delay_ms` from now.
    fn schedule(&self, delay_ms: u64, callback: TimerCallback) -> TimerId;

    /// Disarm a pending trigger. Unknown or already-fired ids are ignored.
    fn cancel(&self, id: TimerId);
}
