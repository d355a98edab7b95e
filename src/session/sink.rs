// Engine sink - routes playback triggers to audio and key lights

use std::sync::{Arc, Mutex};

use ringbuf::traits::Producer;

use crate::messaging::channels::{CommandProducer, NotificationProducer};
use crate::messaging::command::Command;
use crate::messaging::notification::{Notification, NotificationCategory};
use crate::pitch::Pitch;
use crate::playback::PlaybackSink;
use crate::session::lights::KeyLights;
use crate::timers::TimerDriver;

/// The production playback sink: every triggered note is sent to the
/// audio callback and its key lit for the note's duration; session
/// teardown darkens everything and silences all voices.
pub struct EngineSink {
    commands: Arc<Mutex<CommandProducer>>,
    notifications: Arc<Mutex<NotificationProducer>>,
    lights: Arc<KeyLights>,
    timers: Arc<dyn TimerDriver>,
}

impl EngineSink {
    pub fn new(
        commands: Arc<Mutex<CommandProducer>>,
        notifications: Arc<Mutex<NotificationProducer>>,
        lights: Arc<KeyLights>,
        timers: Arc<dyn TimerDriver>,
    ) -> Self {
        Self {
            commands,
            notifications,
            lights,
            timers,
        }
    }

    fn send(&self, command: Command) {
        // A full ring means the audio side is hopelessly behind; the
        // command is dropped rather than blocking the caller.
        let mut tx = self.commands.lock().unwrap();
        let _ = tx.try_push(command);
    }
}

impl PlaybackSink for EngineSink {
    fn note_triggered(&self, note: Pitch, duration_ms: u64) {
        self.send(Command::Trigger { note, duration_ms });

        let token = self.lights.light(note);
        let lights = Arc::clone(&self.lights);
        self.timers.schedule(
            duration_ms,
            Box::new(move || lights.darken_if_current(note, token)),
        );
    }

    fn keys_cleared(&self) {
        self.send(Command::StopAll);
        self.lights.clear_all();
    }

    fn finished(&self) {
        let mut tx = self.notifications.lock().unwrap();
        let _ = tx.try_push(Notification::info(
            NotificationCategory::Playback,
            "Finished!".to_string(),
        ));
    }
}
