#[cfg(feature = "assert-allocs")]
use assert_no_alloc::*;

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    StreamConfig,
};

use crate::{error::Error, output::AudioHostId, synth::GranularSynth};

// -------------------------------------------------------------------------------------------------

const PREFERRED_SAMPLE_FORMAT: cpal::SampleFormat = cpal::SampleFormat::F32;
const PREFERRED_SAMPLE_RATE: cpal::SampleRate = cpal::SampleRate(44100);
const PREFERRED_CHANNELS: cpal::ChannelCount = 2;
const PREFERRED_BUFFER_SIZE: cpal::BufferSize = if cfg!(debug_assertions) {
    cpal::BufferSize::Default
} else {
    cpal::BufferSize::Fixed(1024)
};

// -------------------------------------------------------------------------------------------------

/// Plays a [`GranularSynth`] on an audio output device.
///
/// The synth gets moved into the device's audio callback, which drains the synth's message
/// queue and renders one block at a time. Use the synth's [`SynthHandle`](crate::SynthHandle)
/// to control it while it's playing.
pub struct CpalOutput {
    device: cpal::Device,
    config: StreamConfig,
    stream: Option<cpal::Stream>,
}

impl CpalOutput {
    /// Open the system's default output device.
    pub fn open() -> Result<Self, Error> {
        Self::open_with_host(AudioHostId::Default)
    }

    /// Open the default output device of the given audio host.
    pub fn open_with_host(host_id: AudioHostId) -> Result<Self, Error> {
        let host = match host_id {
            AudioHostId::Default => cpal::default_host(),
            #[cfg(target_os = "windows")]
            AudioHostId::Wasapi => cpal::host_from_id(cpal::HostId::Wasapi)
                .map_err(|err| Error::OutputDeviceError(Box::new(err)))?,
            #[cfg(target_os = "linux")]
            AudioHostId::Alsa => cpal::host_from_id(cpal::HostId::Alsa)
                .map_err(|err| Error::OutputDeviceError(Box::new(err)))?,
        };

        // Open the default output device.
        let device = host
            .default_output_device()
            .ok_or(cpal::DefaultStreamConfigError::DeviceNotAvailable)?;

        if let Ok(name) = device.name() {
            log::info!("Using audio device: {}", name);
        }

        let supported = Self::preferred_output_config(&device)?;
        if supported.sample_format() != PREFERRED_SAMPLE_FORMAT {
            log::warn!(
                "Audio device does not support {:?} samples, trying anyway",
                PREFERRED_SAMPLE_FORMAT
            );
        }
        let config = StreamConfig {
            buffer_size: PREFERRED_BUFFER_SIZE,
            ..supported.config()
        };

        Ok(Self {
            device,
            config,
            stream: None,
        })
    }

    /// The device's output channel count.
    pub fn channel_count(&self) -> usize {
        self.config.channels as usize
    }

    /// The device's output sample rate. Synths which get played on the device must use
    /// this sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Start playing the given synth, replacing any previously playing synth.
    pub fn play(&mut self, mut synth: GranularSynth) -> Result<(), Error> {
        if synth.sample_rate() != self.sample_rate() {
            return Err(Error::ParameterError(format!(
                "synth sample rate {} does not match the output's sample rate {}",
                synth.sample_rate(),
                self.sample_rate()
            )));
        }
        self.close();

        let channel_count = self.channel_count();
        log::info!("Opening output stream: {:?}", self.config);
        let stream = self.device.build_output_stream(
            &self.config,
            move |output: &mut [f32], _: &cpal::OutputCallbackInfo| {
                #[cfg(not(feature = "assert-allocs"))]
                synth.process(output, channel_count);
                #[cfg(feature = "assert-allocs")]
                assert_no_alloc(|| synth.process(output, channel_count));
            },
            |err| {
                log::error!("Audio output error: {}", err);
            },
            None,
        )?;
        stream.play()?;

        self.stream = Some(stream);
        Ok(())
    }

    /// Pause the running output stream, if any.
    pub fn pause(&mut self) -> Result<(), Error> {
        if let Some(stream) = &self.stream {
            log::debug!("Pausing audio output stream");
            stream.pause()?;
        }
        Ok(())
    }

    /// Resume a paused output stream, if any.
    pub fn resume(&mut self) -> Result<(), Error> {
        if let Some(stream) = &self.stream {
            log::debug!("Resuming audio output stream");
            stream.play()?;
        }
        Ok(())
    }

    /// Stop and drop the playing synth.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            log::debug!("Closing audio output stream");
            if let Err(err) = stream.pause() {
                log::error!("Failed to stop stream: {}", err);
            }
        }
    }

    fn preferred_output_config(
        device: &cpal::Device,
    ) -> Result<cpal::SupportedStreamConfig, Error> {
        for s in device.supported_output_configs()? {
            let rates = s.min_sample_rate()..=s.max_sample_rate();
            if s.channels() == PREFERRED_CHANNELS
                && s.sample_format() == PREFERRED_SAMPLE_FORMAT
                && rates.contains(&PREFERRED_SAMPLE_RATE)
            {
                return Ok(s.with_sample_rate(PREFERRED_SAMPLE_RATE));
            }
        }

        Ok(device.default_output_config()?)
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        self.close();
    }
}

// -------------------------------------------------------------------------------------------------

impl From<cpal::DefaultStreamConfigError> for Error {
    fn from(err: cpal::DefaultStreamConfigError) -> Error {
        Error::OutputDeviceError(Box::new(err))
    }
}

impl From<cpal::SupportedStreamConfigsError> for Error {
    fn from(err: cpal::SupportedStreamConfigsError) -> Error {
        Error::OutputDeviceError(Box::new(err))
    }
}

impl From<cpal::BuildStreamError> for Error {
    fn from(err: cpal::BuildStreamError) -> Error {
        Error::OutputDeviceError(Box::new(err))
    }
}

impl From<cpal::PlayStreamError> for Error {
    fn from(err: cpal::PlayStreamError) -> Error {
        Error::OutputDeviceError(Box::new(err))
    }
}

impl From<cpal::PauseStreamError> for Error {
    fn from(err: cpal::PauseStreamError) -> Error {
        Error::OutputDeviceError(Box::new(err))
    }
}
