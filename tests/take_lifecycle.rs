//! End-to-end take lifecycle
//!
//! Drives the full path a user would: capture keys into a take, replay
//! it with pause/resume, save it to disk, reopen the store and play the
//! loaded recording again. Timing runs on the virtual-clock driver so
//! every assertion is deterministic.

use clavier::messaging::channels::{create_command_channel, create_notification_channel};
use clavier::messaging::command::Command;
use clavier::storage::JsonFileStore;
use clavier::timers::ManualTimerDriver;
use clavier::{
    KeyboardSession, Pitch, PlaybackStatus, RecordingStore, SessionError, TimerDriver,
};
use ringbuf::traits::Consumer;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct Harness {
    session: KeyboardSession,
    driver: Arc<ManualTimerDriver>,
    commands: ringbuf::HeapCons<Command>,
    notifications: ringbuf::HeapCons<clavier::Notification>,
}

fn harness(store: Arc<dyn RecordingStore>) -> Harness {
    let (cmd_tx, cmd_rx) = create_command_channel(256);
    let (note_tx, note_rx) = create_notification_channel(256);
    let driver = Arc::new(ManualTimerDriver::new());
    let session = KeyboardSession::new(
        store,
        Arc::clone(&driver) as Arc<dyn TimerDriver>,
        Arc::new(Mutex::new(cmd_tx)),
        Arc::new(Mutex::new(note_tx)),
    );
    Harness {
        session,
        driver,
        commands: cmd_rx,
        notifications: note_rx,
    }
}

impl Harness {
    fn triggers(&mut self) -> Vec<(Pitch, u64)> {
        let mut out = Vec::new();
        while let Some(command) = self.commands.try_pop() {
            if let Command::Trigger { note, duration_ms } = command {
                out.push((note, duration_ms));
            }
        }
        out
    }

    fn messages(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(notification) = self.notifications.try_pop() {
            out.push(notification.message);
        }
        out
    }

    /// C4 at 0ms, E4 at 300ms, G4 at 600ms.
    fn record_arpeggio(&mut self) {
        self.session.start_recording();
        for pitch in [Pitch::C4, Pitch::E4, Pitch::G4] {
            self.session.key_pressed(pitch);
            self.session.key_released(pitch);
            self.driver.advance_ms(300);
        }
        self.session.stop_recording();
        self.triggers();
        self.messages();
    }
}

#[test]
fn test_capture_replay_pause_resume() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonFileStore::open(dir.path()).unwrap());
    let mut h = harness(store);
    h.record_arpeggio();

    h.session.play().unwrap();
    h.driver.advance_ms(250);
    assert_eq!(
        h.triggers().iter().map(|t| t.0).collect::<Vec<_>>(),
        vec![Pitch::C4]
    );

    // Pause mid-gap; nothing fires while paused, however long it lasts
    h.session.pause();
    h.driver.advance_ms(120_000);
    assert!(h.triggers().is_empty());
    assert!(h.messages().iter().any(|m| m == "Paused"));

    // Resume: E4 was due at local 300, we paused at 250, so it fires
    // 50ms after resuming
    h.session.play().unwrap();
    h.driver.advance_ms(49);
    assert!(h.triggers().is_empty());
    h.driver.advance_ms(1);
    assert_eq!(h.triggers(), vec![(Pitch::E4, 200)]);

    // G4 follows at local 600, then completion at 600 + 200 + 300 tail
    h.driver.advance_ms(300);
    assert_eq!(h.triggers(), vec![(Pitch::G4, 200)]);
    h.driver.advance_ms(500);
    assert_eq!(h.session.playback_status(), PlaybackStatus::Finished);
    assert!(h.messages().iter().any(|m| m == "Finished!"));
}

#[test]
fn test_pause_on_note_boundary_refires_that_note() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonFileStore::open(dir.path()).unwrap());
    let mut h = harness(store);
    h.record_arpeggio();

    // Pause at exactly elapsed 300, the instant E4 fired
    h.session.play().unwrap();
    h.driver.advance_ms(300);
    assert_eq!(
        h.triggers().iter().map(|t| t.0).collect::<Vec<_>>(),
        vec![Pitch::C4, Pitch::E4]
    );
    h.session.pause();

    // A note due exactly at the resume offset fires again with delay 0;
    // only notes strictly before the offset are skipped
    h.session.play().unwrap();
    h.driver.advance_ms(0);
    assert_eq!(h.triggers(), vec![(Pitch::E4, 200)]);

    h.driver.advance_ms(300);
    assert_eq!(h.triggers(), vec![(Pitch::G4, 200)]);
}

#[test]
fn test_save_reopen_and_replay_from_disk() {
    let dir = TempDir::new().unwrap();

    let token = {
        let store = Arc::new(JsonFileStore::open(dir.path()).unwrap());
        let mut h = harness(store);
        h.record_arpeggio();
        h.session.save_recording(Some("Lifecycle")).unwrap().token
    };

    // A fresh store over the same directory sees the recording
    let store = Arc::new(JsonFileStore::open(dir.path()).unwrap());
    let mut h = harness(store);

    let recording = h.session.load_and_play(&token).unwrap();
    assert_eq!(recording.name, "Lifecycle");
    assert_eq!(recording.notes.len(), 3);

    h.driver.advance_ms(600);
    let fired: Vec<Pitch> = h.triggers().iter().map(|t| t.0).collect();
    assert_eq!(fired, vec![Pitch::C4, Pitch::E4, Pitch::G4]);
}

#[test]
fn test_failed_save_keeps_take_for_retry() {
    struct FailingStore;

    impl RecordingStore for FailingStore {
        fn save(
            &self,
            _name: Option<&str>,
            _notes: &[clavier::NoteEvent],
        ) -> Result<clavier::storage::SavedRecording, clavier::StorageError> {
            Err(clavier::StorageError::Io(std::io::Error::other("disk full")))
        }

        fn load(&self, token: &str) -> Result<clavier::Recording, clavier::StorageError> {
            Err(clavier::StorageError::NotFound(token.to_string()))
        }
    }

    let mut h = harness(Arc::new(FailingStore));
    h.record_arpeggio();

    let result = h.session.save_recording(None);
    assert!(matches!(result, Err(SessionError::Storage(_))));
    assert!(
        h.messages()
            .iter()
            .any(|m| m == "Error saving recording. Please try again.")
    );

    // The take survived the failure and is still playable
    assert!(h.session.play().is_ok());
    h.driver.advance_ms(0);
    assert_eq!(h.triggers().len(), 1);
}
