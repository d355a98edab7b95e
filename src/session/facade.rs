// Keyboard session - one facade over recorder, playback and storage

use std::sync::{Arc, Mutex};

use ringbuf::traits::Producer;

use crate::messaging::channels::{CommandProducer, NotificationProducer};
use crate::messaging::command::Command;
use crate::messaging::notification::{Notification, NotificationCategory};
use crate::pitch::Pitch;
use crate::playback::{PlaybackError, PlaybackScheduler, PlaybackSink, PlaybackStatus};
use crate::sequence::{NoteEvent, Recorder};
use crate::session::lights::KeyLights;
use crate::session::sink::EngineSink;
use crate::storage::{Recording, RecordingStore, SavedRecording, StorageError};
use crate::timers::TimerDriver;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("nothing to save")]
    NothingToSave,

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Everything one virtual keyboard needs: live play, capture, timed
/// playback and persistence behind a handful of operations.
///
/// The last stopped take stays buffered until it is saved or replaced,
/// so a failed save can be retried and a recorded take can be replayed
/// without going through the store.
pub struct KeyboardSession {
    recorder: Mutex<Recorder>,
    pending_take: Mutex<Vec<NoteEvent>>,
    scheduler: PlaybackScheduler,
    store: Arc<dyn RecordingStore>,
    timers: Arc<dyn TimerDriver>,
    commands: Arc<Mutex<CommandProducer>>,
    notifications: Arc<Mutex<NotificationProducer>>,
    lights: Arc<KeyLights>,
}

impl KeyboardSession {
    pub fn new(
        store: Arc<dyn RecordingStore>,
        timers: Arc<dyn TimerDriver>,
        commands: Arc<Mutex<CommandProducer>>,
        notifications: Arc<Mutex<NotificationProducer>>,
    ) -> Self {
        let lights = Arc::new(KeyLights::new());
        let sink = Arc::new(EngineSink::new(
            Arc::clone(&commands),
            Arc::clone(&notifications),
            Arc::clone(&lights),
            Arc::clone(&timers),
        ));
        let scheduler =
            PlaybackScheduler::new(Arc::clone(&timers), sink as Arc<dyn PlaybackSink>);

        Self {
            recorder: Mutex::new(Recorder::new()),
            pending_take: Mutex::new(Vec::new()),
            scheduler,
            store,
            timers,
            commands,
            notifications,
            lights,
        }
    }

    // --- Live play ---

    /// A key went down: sound it, light it, and capture it if recording.
    pub fn key_pressed(&self, pitch: Pitch) {
        self.recorder
            .lock()
            .unwrap()
            .note_pressed(pitch, self.timers.now_ms());
        self.send(Command::Press(pitch));
        self.lights.light(pitch);
    }

    /// A key came up: start its release and darken it.
    pub fn key_released(&self, pitch: Pitch) {
        self.send(Command::Release(pitch));
        self.lights.darken(pitch);
    }

    pub fn set_volume(&self, volume: f32) {
        self.send(Command::SetVolume(volume));
    }

    // --- Recording ---

    pub fn start_recording(&self) {
        self.recorder.lock().unwrap().arm(self.timers.now_ms());
        self.notify(Notification::info(
            NotificationCategory::Recording,
            "Recording...".to_string(),
        ));
    }

    /// Stop capturing. A non-empty take replaces the pending buffer; an
    /// empty one leaves it untouched.
    pub fn stop_recording(&self) -> usize {
        let notes = self.recorder.lock().unwrap().disarm();
        let count = notes.len();
        if notes.is_empty() {
            self.notify(Notification::warning(
                NotificationCategory::Recording,
                "No notes recorded. Try again!".to_string(),
            ));
        } else {
            *self.pending_take.lock().unwrap() = notes;
            self.notify(Notification::info(
                NotificationCategory::Recording,
                format!("Recorded {} notes", count),
            ));
        }
        count
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.lock().unwrap().is_armed()
    }

    // --- Playback ---

    /// Play the pending take, or resume if paused.
    pub fn play(&self) -> Result<(), SessionError> {
        if self.scheduler.status() == PlaybackStatus::Paused {
            self.scheduler.play(&[])?;
            self.notify_playing();
            return Ok(());
        }

        let notes = self.pending_take.lock().unwrap().clone();
        match self.scheduler.play(&notes) {
            Ok(()) => {
                self.notify_playing();
                Ok(())
            }
            Err(err @ PlaybackError::EmptySequence) => {
                self.notify(Notification::warning(
                    NotificationCategory::Playback,
                    "Nothing to play!".to_string(),
                ));
                Err(err.into())
            }
        }
    }

    pub fn pause(&self) {
        self.scheduler.pause();
        if self.scheduler.status() == PlaybackStatus::Paused {
            self.notify(Notification::info(
                NotificationCategory::Playback,
                "Paused".to_string(),
            ));
        }
    }

    pub fn stop_playback(&self) {
        self.scheduler.stop();
    }

    pub fn playback_status(&self) -> PlaybackStatus {
        self.scheduler.status()
    }

    // --- Persistence ---

    /// Save the pending take. The buffer is cleared only on success, so
    /// a failed save can be retried.
    pub fn save_recording(&self, name: Option<&str>) -> Result<SavedRecording, SessionError> {
        let notes = self.pending_take.lock().unwrap().clone();
        if notes.is_empty() {
            self.notify(Notification::warning(
                NotificationCategory::Storage,
                "Nothing to save".to_string(),
            ));
            return Err(SessionError::NothingToSave);
        }

        self.notify(Notification::info(
            NotificationCategory::Storage,
            "Saving...".to_string(),
        ));

        match self.store.save(name, &notes) {
            Ok(saved) => {
                self.pending_take.lock().unwrap().clear();
                self.notify(Notification::info(
                    NotificationCategory::Storage,
                    format!("Saved \"{}\"", saved.name),
                ));
                Ok(saved)
            }
            Err(err) => {
                self.notify(Notification::error(
                    NotificationCategory::Storage,
                    "Error saving recording. Please try again.".to_string(),
                ));
                Err(err.into())
            }
        }
    }

    /// Fetch a recording by token and start playing it. The loaded notes
    /// become the pending take so pause/resume/replay work on them.
    pub fn load_and_play(&self, token: &str) -> Result<Recording, SessionError> {
        let recording = match self.store.load(token) {
            Ok(recording) => recording,
            Err(err) => {
                self.notify(Notification::error(
                    NotificationCategory::Storage,
                    format!("Recording not found: {}", token),
                ));
                return Err(err.into());
            }
        };

        *self.pending_take.lock().unwrap() = recording.notes.clone();
        // A paused session would otherwise resume its old sequence and
        // ignore the loaded notes.
        self.scheduler.stop();
        self.scheduler.play(&recording.notes)?;
        self.notify_playing();
        Ok(recording)
    }

    pub fn lit_keys(&self) -> Vec<Pitch> {
        self.lights.lit_keys()
    }

    fn notify_playing(&self) {
        self.notify(Notification::info(
            NotificationCategory::Playback,
            "Playing...".to_string(),
        ));
    }

    fn send(&self, command: Command) {
        let mut tx = self.commands.lock().unwrap();
        let _ = tx.try_push(command);
    }

    fn notify(&self, notification: Notification) {
        let mut tx = self.notifications.lock().unwrap();
        let _ = tx.try_push(notification);
    }
}
