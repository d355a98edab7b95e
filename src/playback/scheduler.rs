// Playback scheduler - replays a note sequence with pause/resume
//
// All timing is integer milliseconds on the timer driver's clock. The
// session state machine is Idle -> Playing -> {Paused, Finished};
// Paused -> Playing (resume) or Idle (stop); Finished -> Idle on the
// next play. Triggers that fire after a pause/stop are no-ops: they are
// guarded by the session status and an epoch counter, because timer
// cancellation alone is not race-free against an already-fired callback.

use crate::playback::sink::PlaybackSink;
use crate::sequence::NoteEvent;
use crate::timers::{TimerDriver, TimerId};
use std::sync::{Arc, Mutex};

/// How long a voice keeps sounding past its sustain window.
pub const RELEASE_TAIL_MS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Idle,
    Playing,
    Paused,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    #[error("nothing to play")]
    EmptySequence,
}

struct SessionState {
    status: PlaybackStatus,
    /// Bumped on every transition that invalidates outstanding triggers.
    epoch: u64,
    /// Driver-clock instant treated as elapsed-time zero.
    origin_ms: u64,
    elapsed_at_pause_ms: u64,
    next_index: usize,
    pending: Vec<TimerId>,
    sequence: Vec<NoteEvent>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            status: PlaybackStatus::Idle,
            epoch: 0,
            origin_ms: 0,
            elapsed_at_pause_ms: 0,
            next_index: 0,
            pending: Vec::new(),
            sequence: Vec::new(),
        }
    }
}

/// Replays a stored sequence against the timer driver's clock.
///
/// One session at a time: a `play` while already playing fully cancels
/// the running session before starting over.
pub struct PlaybackScheduler {
    state: Arc<Mutex<SessionState>>,
    timers: Arc<dyn TimerDriver>,
    sink: Arc<dyn PlaybackSink>,
}

impl PlaybackScheduler {
    pub fn new(timers: Arc<dyn TimerDriver>, sink: Arc<dyn PlaybackSink>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::new())),
            timers,
            sink,
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.lock().unwrap().status
    }

    /// Start playing `notes`, or resume the paused session.
    ///
    /// From Idle/Finished an empty sequence is rejected. From Paused the
    /// stored sequence resumes where it left off and `notes` is ignored;
    /// the timeline origin is recomputed so a note due at elapsed time T
    /// still fires at elapsed time T however long the pause lasted.
    pub fn play(&self, notes: &[NoteEvent]) -> Result<(), PlaybackError> {
        let mut cleared_keys = false;
        {
            let mut state = self.state.lock().unwrap();
            match state.status {
                PlaybackStatus::Paused => {
                    state.epoch += 1;
                    state.status = PlaybackStatus::Playing;
                    state.origin_ms = self
                        .timers
                        .now_ms()
                        .saturating_sub(state.elapsed_at_pause_ms);
                    let from = state.elapsed_at_pause_ms;
                    self.schedule_from(&mut state, from);
                }
                PlaybackStatus::Playing => {
                    // Replacing a live session: cancel it outright first.
                    self.cancel_pending(&mut state);
                    cleared_keys = true;
                    self.start_fresh(&mut state, notes)?;
                }
                PlaybackStatus::Idle | PlaybackStatus::Finished => {
                    self.start_fresh(&mut state, notes)?;
                }
            }
        }
        if cleared_keys {
            self.sink.keys_cleared();
        }
        Ok(())
    }

    /// Freeze elapsed time and cancel every pending trigger.
    ///
    /// No-op unless Playing; a stale pause (double click) is tolerated.
    pub fn pause(&self) {
        let mut state = self.state.lock().unwrap();
        if state.status != PlaybackStatus::Playing {
            return;
        }
        state.elapsed_at_pause_ms = self.timers.now_ms().saturating_sub(state.origin_ms);
        self.cancel_pending(&mut state);
        state.epoch += 1;
        state.status = PlaybackStatus::Paused;
    }

    /// Tear the session down and clear all key indicators.
    ///
    /// Valid from Playing, Paused and Finished; stop from Idle (or a
    /// second stop in a row) leaves state unchanged.
    pub fn stop(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if state.status == PlaybackStatus::Idle {
                return;
            }
            self.cancel_pending(&mut state);
            state.epoch += 1;
            state.status = PlaybackStatus::Idle;
            state.origin_ms = 0;
            state.elapsed_at_pause_ms = 0;
            state.next_index = 0;
            state.sequence.clear();
        }
        self.sink.keys_cleared();
    }

    fn start_fresh(
        &self,
        state: &mut SessionState,
        notes: &[NoteEvent],
    ) -> Result<(), PlaybackError> {
        if notes.is_empty() {
            return Err(PlaybackError::EmptySequence);
        }
        state.epoch += 1;
        state.status = PlaybackStatus::Playing;
        state.origin_ms = self.timers.now_ms();
        state.elapsed_at_pause_ms = 0;
        state.next_index = 0;
        state.sequence = notes.to_vec();
        self.schedule_from(state, 0);
        Ok(())
    }

    /// Arm one trigger per note with `offset_ms >= from_ms`.
    ///
    /// A note exactly at the boundary fires with delay 0, not skipped.
    /// Notes already due before the pause never fire again. When even the
    /// last note is already behind the resume point, only the completion
    /// trigger is re-armed so the session still finishes on time.
    fn schedule_from(&self, state: &mut SessionState, from_ms: u64) {
        let epoch = state.epoch;
        let last_index = state.sequence.len() - 1;
        let last = state.sequence[last_index];

        for (index, note) in state.sequence.clone().into_iter().enumerate() {
            if note.offset_ms < from_ms {
                continue;
            }
            let delay = note.offset_ms - from_ms;
            let shared = Arc::clone(&self.state);
            let sink = Arc::clone(&self.sink);
            let timers = Arc::clone(&self.timers);

            let id = self.timers.schedule(
                delay,
                Box::new(move || {
                    fire_note(shared, sink, timers, epoch, index, note, index == last_index);
                }),
            );
            state.pending.push(id);
        }

        if last.offset_ms < from_ms {
            let delay = (last.end_ms() + RELEASE_TAIL_MS).saturating_sub(from_ms);
            let completion_state = Arc::clone(&self.state);
            let completion_sink = Arc::clone(&self.sink);
            let id = self.timers.schedule(
                delay,
                Box::new(move || {
                    finish_session(completion_state, completion_sink, epoch);
                }),
            );
            state.pending.push(id);
        }
    }

    fn cancel_pending(&self, state: &mut SessionState) {
        for id in state.pending.drain(..) {
            self.timers.cancel(id);
        }
    }
}

/// Trigger body for one scheduled note.
///
/// Guarded: only acts while the session that armed it is still Playing.
fn fire_note(
    state: Arc<Mutex<SessionState>>,
    sink: Arc<dyn PlaybackSink>,
    timers: Arc<dyn TimerDriver>,
    epoch: u64,
    index: usize,
    note: NoteEvent,
    is_last: bool,
) {
    {
        let mut session = state.lock().unwrap();
        if session.status != PlaybackStatus::Playing || session.epoch != epoch {
            return;
        }
        session.next_index = index + 1;

        if is_last {
            // One more trigger after the final note's sound has fully
            // decayed, to report completion.
            let completion_state = Arc::clone(&state);
            let completion_sink = Arc::clone(&sink);
            let id = timers.schedule(
                note.duration_ms + RELEASE_TAIL_MS,
                Box::new(move || {
                    finish_session(completion_state, completion_sink, epoch);
                }),
            );
            session.pending.push(id);
        }
    }
    sink.note_triggered(note.note, note.duration_ms);
}

fn finish_session(state: Arc<Mutex<SessionState>>, sink: Arc<dyn PlaybackSink>, epoch: u64) {
    {
        let mut session = state.lock().unwrap();
        if session.status != PlaybackStatus::Playing || session.epoch != epoch {
            return;
        }
        session.status = PlaybackStatus::Finished;
        session.pending.clear();
    }
    sink.finished();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::Pitch;
    use crate::timers::ManualTimerDriver;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Collects triggered notes with the virtual-clock time they fired at.
    struct CollectingSink {
        driver: Arc<ManualTimerDriver>,
        fired: Mutex<Vec<(Pitch, u64)>>,
        clears: AtomicUsize,
        finishes: AtomicUsize,
    }

    impl CollectingSink {
        fn new(driver: Arc<ManualTimerDriver>) -> Self {
            Self {
                driver,
                fired: Mutex::new(Vec::new()),
                clears: AtomicUsize::new(0),
                finishes: AtomicUsize::new(0),
            }
        }

        fn fired(&self) -> Vec<(Pitch, u64)> {
            self.fired.lock().unwrap().clone()
        }
    }

    impl PlaybackSink for CollectingSink {
        fn note_triggered(&self, note: Pitch, _duration_ms: u64) {
            self.fired.lock().unwrap().push((note, self.driver.now_ms()));
        }

        fn keys_cleared(&self) {
            self.clears.fetch_add(1, Ordering::SeqCst);
        }

        fn finished(&self) {
            self.finishes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn setup() -> (Arc<ManualTimerDriver>, Arc<CollectingSink>, PlaybackScheduler) {
        let driver = Arc::new(ManualTimerDriver::new());
        let sink = Arc::new(CollectingSink::new(Arc::clone(&driver)));
        let scheduler = PlaybackScheduler::new(
            Arc::clone(&driver) as Arc<dyn TimerDriver>,
            Arc::clone(&sink) as Arc<dyn PlaybackSink>,
        );
        (driver, sink, scheduler)
    }

    fn chord_sequence() -> Vec<NoteEvent> {
        vec![
            NoteEvent::with_duration(Pitch::C4, 0, 200),
            NoteEvent::with_duration(Pitch::E4, 100, 200),
            NoteEvent::with_duration(Pitch::G4, 100, 200),
        ]
    }

    #[test]
    fn test_notes_fire_at_their_offsets() {
        let (driver, sink, scheduler) = setup();
        scheduler.play(&chord_sequence()).unwrap();

        driver.advance_ms(100);
        assert_eq!(
            sink.fired(),
            vec![(Pitch::C4, 0), (Pitch::E4, 100), (Pitch::G4, 100)]
        );
    }

    #[test]
    fn test_equal_offsets_fire_in_sequence_order() {
        let (driver, sink, scheduler) = setup();
        scheduler.play(&chord_sequence()).unwrap();
        driver.advance_ms(100);

        let fired = sink.fired();
        // E4 was inserted before G4 at offset 100
        assert_eq!(fired[1].0, Pitch::E4);
        assert_eq!(fired[2].0, Pitch::G4);
    }

    #[test]
    fn test_completion_exactly_once_at_decay_end() {
        let (driver, sink, scheduler) = setup();
        scheduler.play(&chord_sequence()).unwrap();

        // Last note due at 100, sounds 200, tail 300 -> done at 600
        driver.advance_ms(599);
        assert_eq!(sink.finishes.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.status(), PlaybackStatus::Playing);

        driver.advance_ms(1);
        assert_eq!(sink.finishes.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.status(), PlaybackStatus::Finished);

        driver.advance_ms(10_000);
        assert_eq!(sink.finishes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_sequence_rejected_from_idle() {
        let (_driver, _sink, scheduler) = setup();
        assert_eq!(scheduler.play(&[]), Err(PlaybackError::EmptySequence));
        assert_eq!(scheduler.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn test_pause_freezes_elapsed_and_resume_preserves_timeline() {
        let (driver, sink, scheduler) = setup();
        scheduler.play(&chord_sequence()).unwrap();

        driver.advance_ms(50);
        scheduler.pause();
        assert_eq!(scheduler.status(), PlaybackStatus::Paused);
        assert_eq!(sink.fired().len(), 1); // only C4 so far

        // A long pause must not leak into the timeline
        driver.advance_ms(5000);
        assert_eq!(sink.fired().len(), 1);

        scheduler.play(&[]).unwrap(); // resume; argument ignored
        assert_eq!(scheduler.status(), PlaybackStatus::Playing);

        driver.advance_ms(50);
        let fired = sink.fired();
        assert_eq!(fired.len(), 3);
        // Local elapsed 100 == wall 50 + 5000 pause + 50
        assert_eq!(fired[1], (Pitch::E4, 5100));
        assert_eq!(fired[2], (Pitch::G4, 5100));

        // Completion at local elapsed 600 -> wall 5600
        driver.advance_ms(500);
        assert_eq!(sink.finishes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_note_already_due_never_fires_again() {
        let (driver, sink, scheduler) = setup();
        scheduler.play(&chord_sequence()).unwrap();

        driver.advance_ms(150);
        assert_eq!(sink.fired().len(), 3);
        scheduler.pause();
        driver.advance_ms(5000);
        scheduler.play(&[]).unwrap();

        // Nothing fires twice, and completion still lands at local
        // elapsed 600 (wall 150 + 5000 + 450) despite the pause gap
        driver.advance_ms(449);
        assert_eq!(sink.fired().len(), 3);
        assert_eq!(sink.finishes.load(Ordering::SeqCst), 0);

        driver.advance_ms(1);
        assert_eq!(sink.finishes.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.status(), PlaybackStatus::Finished);
    }

    #[test]
    fn test_note_at_pause_boundary_fires_on_resume() {
        let (driver, sink, scheduler) = setup();
        let notes = vec![
            NoteEvent::new(Pitch::C4, 0),
            NoteEvent::new(Pitch::D4, 100),
        ];
        scheduler.play(&notes).unwrap();

        driver.advance_ms(50);
        scheduler.pause();
        // Manually simulate pausing exactly at an offset boundary
        scheduler.state.lock().unwrap().elapsed_at_pause_ms = 100;

        scheduler.play(&[]).unwrap();
        driver.advance_ms(0);

        // offset == fromOffset fires with delay 0, not skipped
        let fired = sink.fired();
        assert_eq!(fired.last().unwrap().0, Pitch::D4);
    }

    #[test]
    fn test_stop_cancels_pending_and_clears_keys() {
        let (driver, sink, scheduler) = setup();
        scheduler.play(&chord_sequence()).unwrap();
        driver.advance_ms(10);

        scheduler.stop();
        assert_eq!(scheduler.status(), PlaybackStatus::Idle);
        assert_eq!(sink.clears.load(Ordering::SeqCst), 1);

        driver.advance_ms(10_000);
        // Only the note that was due before the stop ever fired
        assert_eq!(sink.fired().len(), 1);
        assert_eq!(sink.finishes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (_driver, sink, scheduler) = setup();

        scheduler.stop();
        scheduler.stop();
        assert_eq!(scheduler.status(), PlaybackStatus::Idle);
        assert_eq!(sink.clears.load(Ordering::SeqCst), 0);

        scheduler.play(&chord_sequence()).unwrap();
        scheduler.stop();
        scheduler.stop();
        assert_eq!(scheduler.status(), PlaybackStatus::Idle);
        assert_eq!(sink.clears.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pause_from_invalid_state_is_noop() {
        let (_driver, _sink, scheduler) = setup();
        scheduler.pause();
        assert_eq!(scheduler.status(), PlaybackStatus::Idle);

        scheduler.play(&chord_sequence()).unwrap();
        scheduler.pause();
        scheduler.pause(); // double click
        assert_eq!(scheduler.status(), PlaybackStatus::Paused);
    }

    #[test]
    fn test_play_replaces_running_session() {
        let (driver, sink, scheduler) = setup();
        scheduler.play(&chord_sequence()).unwrap();
        driver.advance_ms(10);

        let other = vec![NoteEvent::new(Pitch::A4, 0)];
        scheduler.play(&other).unwrap();
        driver.advance_ms(600);

        let fired = sink.fired();
        // C4 from the first session at t=0, then only A4; E4/G4 never fire
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[1].0, Pitch::A4);
        assert_eq!(sink.clears.load(Ordering::SeqCst), 1);
        assert_eq!(sink.finishes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_play_again_after_finish() {
        let (driver, sink, scheduler) = setup();
        let notes = vec![NoteEvent::new(Pitch::C4, 0)];
        scheduler.play(&notes).unwrap();
        driver.advance_ms(500);
        assert_eq!(scheduler.status(), PlaybackStatus::Finished);

        scheduler.play(&notes).unwrap();
        assert_eq!(scheduler.status(), PlaybackStatus::Playing);
        driver.advance_ms(500);
        assert_eq!(sink.fired().len(), 2);
        assert_eq!(sink.finishes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_pause_then_stop_goes_idle() {
        let (driver, sink, scheduler) = setup();
        scheduler.play(&chord_sequence()).unwrap();
        driver.advance_ms(50);
        scheduler.pause();
        scheduler.stop();

        assert_eq!(scheduler.status(), PlaybackStatus::Idle);
        assert_eq!(sink.clears.load(Ordering::SeqCst), 1);
        driver.advance_ms(10_000);
        assert_eq!(sink.fired().len(), 1);
    }
}
