//! Shared, immutable, already decoded multi-channel sample data.

use std::{path::Path, sync::Arc};

use assume::assume;

use crate::Error;

mod decoder;
use decoder::AudioDecoder;

// -------------------------------------------------------------------------------------------------

/// Interpolation method which is used to read sample buffers at fractional frame positions.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::EnumString,
    strum::Display,
    strum::VariantNames,
    strum::FromRepr,
)]
#[repr(u8)]
pub enum SampleInterpolation {
    /// Linear interpolation between two neighboring frames. Fast.
    Linear,
    /// 4-point Catmull-Rom interpolation. Slower, but less dull at low pitches.
    #[default]
    Cubic,
}

// -------------------------------------------------------------------------------------------------

/// An immutable, interleaved, multi-channel `f32` sample buffer.
///
/// Clones are cheap: the sample data is shared via an `Arc`, so a buffer can be handed to the
/// audio thread without copying or reallocating it there.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Arc<[f32]>,
    channel_count: usize,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Wrap already decoded interleaved samples.
    ///
    /// Fails when the buffer is empty, when the sample count is not a multiple of the channel
    /// count, or when channel count or sample rate are zero.
    pub fn from_interleaved(
        samples: Vec<f32>,
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self, Error> {
        if channel_count == 0 {
            return Err(Error::ParameterError(
                "sample buffer needs at least one channel".to_string(),
            ));
        }
        if sample_rate == 0 {
            return Err(Error::ParameterError(
                "sample buffer needs a non zero sample rate".to_string(),
            ));
        }
        if samples.is_empty() || samples.len() % channel_count != 0 {
            return Err(Error::ParameterError(format!(
                "sample buffer length {} is not a non zero multiple of its channel count {}",
                samples.len(),
                channel_count
            )));
        }
        Ok(Self {
            samples: samples.into(),
            channel_count,
            sample_rate,
        })
    }

    /// Decode the given audio file (wav, aiff, flac, ogg, mp3) into a new sample buffer.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let mut decoder = AudioDecoder::from_file(path.as_ref())?;
        let spec = decoder.signal_spec()?;
        let samples = decoder.decode_all()?;
        let buffer = Self::from_interleaved(samples, spec.channels.count(), spec.rate)?;
        log::info!(
            "Decoded sample file '{}': {} frames, {} channels, {} Hz",
            path.as_ref().display(),
            buffer.frame_count(),
            buffer.channel_count(),
            buffer.sample_rate()
        );
        Ok(buffer)
    }

    /// Raw access to the interleaved sample data.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of interleaved channels.
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Sample rate of the sample data.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel).
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channel_count
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Read the given channel at the given time in seconds.
    ///
    /// Channels beyond the buffer's channel count wrap around, so e.g. mono samples feed
    /// all channels of a stereo output. Times are clamped to the buffer's first and last frame.
    #[inline]
    pub fn sample(&self, channel: usize, time: f64, interpolation: SampleInterpolation) -> f32 {
        let channel = channel % self.channel_count;
        let max_frame = self.frame_count() - 1;
        let position = (time * self.sample_rate as f64).clamp(0.0, max_frame as f64);
        let frame = (position as usize).min(max_frame);
        let fraction = (position - frame as f64) as f32;
        match interpolation {
            SampleInterpolation::Linear => {
                let y0 = self.frame_value(frame, channel);
                let y1 = self.frame_value((frame + 1).min(max_frame), channel);
                y0 + (y1 - y0) * fraction
            }
            SampleInterpolation::Cubic => {
                let y0 = self.frame_value(frame.saturating_sub(1), channel);
                let y1 = self.frame_value(frame, channel);
                let y2 = self.frame_value((frame + 1).min(max_frame), channel);
                let y3 = self.frame_value((frame + 2).min(max_frame), channel);

                // Cubic interpolation (Catmull-Rom)
                let a = -0.5 * y0 + 1.5 * y1 - 1.5 * y2 + 0.5 * y3;
                let b = y0 - 2.5 * y1 + 2.0 * y2 - 0.5 * y3;
                let c = -0.5 * y0 + 0.5 * y2;
                let d = y1;

                a * fraction * fraction * fraction + b * fraction * fraction + c * fraction + d
            }
        }
    }

    #[inline(always)]
    fn frame_value(&self, frame: usize, channel: usize) -> f32 {
        let index = frame * self.channel_count + channel;
        assume!(unsafe: index < self.samples.len(), "Frame and channel are clamped by the caller");
        self.samples[index]
    }
}

// -------------------------------------------------------------------------------------------------
