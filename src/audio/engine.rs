// Audio engine - real-time CPAL callback
//
// The callback owns the voice bank outright: commands arrive over a
// lock-free ringbuf, get applied at the top of each buffer, and the
// mono mix is written to every channel of the interleaved output.
// Supported device formats: f32, i16, u16 (selected by the device's
// preferred format; all internal processing is f32).

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer};
use std::sync::{Arc, Mutex};

use crate::messaging::channels::{CommandConsumer, NotificationProducer};
use crate::messaging::command::Command;
use crate::messaging::notification::{Notification, NotificationCategory};
use crate::pitch::FrequencyTable;
use crate::synth::VoiceBank;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio output device found")]
    NoDevice,

    #[error("failed to query output config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("unsupported sample format: {0:?}")]
    UnsupportedFormat(SampleFormat),

    #[error("failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

pub struct AudioEngine {
    _device: Device,
    _stream: Stream,
    sample_rate: f32,
}

impl AudioEngine {
    /// Open the default output device and start the stream.
    ///
    /// The caller decides what to do when this fails; the rest of the
    /// engine (recorder, scheduler) keeps working without audio.
    pub fn new(
        command_rx: CommandConsumer,
        notification_tx: Arc<Mutex<NotificationProducer>>,
        table: FrequencyTable,
    ) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &config,
                channels,
                sample_rate,
                command_rx,
                notification_tx,
                table,
            ),
            SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &config,
                channels,
                sample_rate,
                command_rx,
                notification_tx,
                table,
            ),
            SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &config,
                channels,
                sample_rate,
                command_rx,
                notification_tx,
                table,
            ),
            other => return Err(AudioError::UnsupportedFormat(other)),
        }?;

        stream.play()?;

        Ok(Self {
            _device: device,
            _stream: stream,
            sample_rate,
        })
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        sample_rate: f32,
        mut command_rx: CommandConsumer,
        notification_tx: Arc<Mutex<NotificationProducer>>,
        table: FrequencyTable,
    ) -> Result<Stream, AudioError>
    where
        T: SizedSample + FromSample<f32>,
    {
        let mut bank = VoiceBank::new(sample_rate);
        let mut volume: f32 = 1.0;

        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // Real-time zone: no allocation, no blocking, no I/O
                while let Some(command) = command_rx.try_pop() {
                    match command {
                        Command::Press(pitch) => bank.press(pitch, table.frequency(pitch)),
                        Command::Release(pitch) => bank.release(pitch),
                        Command::Trigger { note, duration_ms } => {
                            bank.trigger(note, table.frequency(note), duration_ms)
                        }
                        Command::StopAll => bank.stop_all(),
                        Command::SetVolume(v) => volume = v.clamp(0.0, 1.0),
                    }
                }

                for frame in data.chunks_mut(channels) {
                    let sample = (bank.next_sample() * volume).clamp(-1.0, 1.0);
                    let converted = T::from_sample(sample);
                    for out in frame.iter_mut() {
                        *out = converted;
                    }
                }
            },
            move |err| {
                if let Ok(mut tx) = notification_tx.try_lock() {
                    let _ = tx.try_push(Notification::error(
                        NotificationCategory::Audio,
                        format!("Audio stream error: {}", err),
                    ));
                }
            },
            None,
        )?;

        Ok(stream)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}
