use std::{fs::File, io::BufWriter, path::Path, time::Duration};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::{error::Error, synth::GranularSynth};

// -------------------------------------------------------------------------------------------------

const BUFFER_SIZE_FRAMES: usize = 1024;

// -------------------------------------------------------------------------------------------------

/// Renders a [`GranularSynth`] offline into a 32-bit float wav file.
///
/// Unlike [`CpalOutput`](super::cpal::CpalOutput), the synth stays owned by the caller, so
/// notes can be scheduled between [`render`](Self::render) calls. Messages sent via a
/// [`SynthHandle`](crate::SynthHandle) get applied at the start of each rendered block.
pub struct WavOutput {
    writer: Option<WavWriter<BufWriter<File>>>,
    channel_count: usize,
    sample_rate: u32,
    buffer: Vec<f32>,
    frames_written: u64,
}

impl WavOutput {
    /// Create a new wav file at the given path.
    pub fn open<P: AsRef<Path>>(
        path: P,
        sample_rate: u32,
        channel_count: usize,
    ) -> Result<Self, Error> {
        if channel_count == 0 || channel_count > u16::MAX as usize {
            return Err(Error::ParameterError(format!(
                "Invalid wav output channel count: '{channel_count}'"
            )));
        }
        if sample_rate == 0 {
            return Err(Error::ParameterError(
                "wav output sample rate must not be zero".to_string(),
            ));
        }
        let spec = WavSpec {
            channels: channel_count as u16,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        log::info!(
            "Opening wav output '{}': {} channels @ {} Hz",
            path.as_ref().display(),
            channel_count,
            sample_rate
        );
        let writer =
            WavWriter::create(path, spec).map_err(|err| Error::OutputDeviceError(Box::new(err)))?;
        let buffer = vec![0.0; BUFFER_SIZE_FRAMES * channel_count];
        Ok(Self {
            writer: Some(writer),
            channel_count,
            sample_rate,
            buffer,
            frames_written: 0,
        })
    }

    /// The file's channel count.
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// The file's sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Render the given duration of the synth's output into the file.
    pub fn render(&mut self, synth: &mut GranularSynth, duration: Duration) -> Result<(), Error> {
        if synth.sample_rate() != self.sample_rate {
            return Err(Error::ParameterError(format!(
                "synth sample rate {} does not match the output's sample rate {}",
                synth.sample_rate(),
                self.sample_rate
            )));
        }
        let writer = self.writer.as_mut().ok_or_else(|| {
            Error::OutputDeviceError("wav output got already finalized".into())
        })?;
        let mut frames_left = (duration.as_secs_f64() * self.sample_rate as f64).round() as u64;
        while frames_left > 0 {
            let frames = (frames_left as usize).min(BUFFER_SIZE_FRAMES);
            let output = &mut self.buffer[..frames * self.channel_count];
            synth.process(output, self.channel_count);
            for sample in output.iter() {
                writer
                    .write_sample(*sample)
                    .map_err(|err| Error::OutputDeviceError(Box::new(err)))?;
            }
            frames_left -= frames as u64;
            self.frames_written += frames as u64;
        }
        Ok(())
    }

    /// Flush and close the file. Further renders will fail.
    pub fn finalize(&mut self) -> Result<(), Error> {
        if let Some(writer) = self.writer.take() {
            log::debug!("Finalizing wav output: {} frames", self.frames_written);
            writer
                .finalize()
                .map_err(|err| Error::OutputDeviceError(Box::new(err)))?;
        }
        Ok(())
    }
}

impl Drop for WavOutput {
    fn drop(&mut self) {
        if let Err(err) = self.finalize() {
            log::error!("Failed to finalize wav output: {}", err);
        }
    }
}
