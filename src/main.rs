use clavier::{
    AudioEngine, FrequencyTable, JsonFileStore, KeyboardSession, MemoryStore, Pitch,
    PlaybackStatus, RecordingStore, ThreadTimerDriver, TimerDriver, create_command_channel,
    create_notification_channel,
};
use ringbuf::traits::{Consumer, Producer};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

// Ringbuffer capacity constants
// The audio callback drains commands every buffer (~10ms), so even a
// fast mashing of keys stays far below these.
const COMMAND_RINGBUFFER_CAPACITY: usize = 512;
const NOTIFICATION_RINGBUFFER_CAPACITY: usize = 256;

fn main() {
    println!("=== Clavier ===");
    println!("Virtual keyboard: capture, timed playback, persistence\n");

    let (command_tx, command_rx) = create_command_channel(COMMAND_RINGBUFFER_CAPACITY);
    let (notification_tx, mut notification_rx) =
        create_notification_channel(NOTIFICATION_RINGBUFFER_CAPACITY);
    let command_tx = Arc::new(Mutex::new(command_tx));
    let notification_tx = Arc::new(Mutex::new(notification_tx));

    println!("Audio engine initialisation...");
    let _audio = match AudioEngine::new(
        command_rx,
        Arc::clone(&notification_tx),
        FrequencyTable::standard(),
    ) {
        Ok(engine) => {
            println!("Audio ready ({} Hz)", engine.sample_rate());
            Some(engine)
        }
        Err(e) => {
            eprintln!("No audio output ({}); running silently", e);
            if let Ok(mut tx) = notification_tx.lock() {
                let _ = tx.try_push(clavier::Notification::error(
                    clavier::messaging::NotificationCategory::Audio,
                    format!("Audio unavailable: {}", e),
                ));
            }
            None
        }
    };

    let timers: Arc<dyn TimerDriver> = Arc::new(ThreadTimerDriver::new());

    let store: Arc<dyn RecordingStore> = match JsonFileStore::open(JsonFileStore::default_dir()) {
        Ok(store) => {
            println!("Recordings stored in {}", store.dir().display());
            Arc::new(store)
        }
        Err(e) => {
            eprintln!("File store unavailable ({}); keeping recordings in memory", e);
            Arc::new(MemoryStore::new())
        }
    };

    let session = KeyboardSession::new(store, timers, command_tx, notification_tx);

    // Capture a short arpeggio the way a player would enter it
    println!("\nRecording a demo take...");
    session.start_recording();
    for pitch in [Pitch::C4, Pitch::E4, Pitch::G4, Pitch::C5] {
        session.key_pressed(pitch);
        thread::sleep(Duration::from_millis(200));
        session.key_released(pitch);
        thread::sleep(Duration::from_millis(50));
    }
    session.stop_recording();

    let token = match session.save_recording(Some("Demo arpeggio")) {
        Ok(saved) => {
            println!("Saved \"{}\" (token {})", saved.name, saved.token);
            Some(saved.token)
        }
        Err(e) => {
            eprintln!("Save failed: {}", e);
            None
        }
    };

    if let Some(token) = token {
        println!("\nPlaying it back...");
        if let Err(e) = session.load_and_play(&token) {
            eprintln!("Playback failed: {}", e);
        }

        while session.playback_status() == PlaybackStatus::Playing {
            while let Some(notification) = notification_rx.try_pop() {
                println!("[{:?}] {}", notification.level, notification.message);
            }
            thread::sleep(Duration::from_millis(50));
        }
    }

    while let Some(notification) = notification_rx.try_pop() {
        println!("[{:?}] {}", notification.level, notification.message);
    }

    println!("\nDone.");
}
