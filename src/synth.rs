//! The polyphonic granular synth: a fixed voice pool playing a shared sample buffer.

use std::sync::Arc;

use crossbeam_queue::ArrayQueue;
use four_cc::FourCC;

use crate::{
    envelope::AdsrParameters,
    grain::GrainPlayMode,
    parameter::{Parameter, ParameterValueUpdate},
    sample::{SampleBuffer, SampleInterpolation},
    voice::{GranularVoice, VoiceGrainSettings, VoiceNoteSettings, VoiceRandomSettings, VoiceState},
    Error,
};

// -------------------------------------------------------------------------------------------------

mod message;
mod parameters;

pub use message::{SynthHandle, SynthMessage};
pub use parameters::SynthParameters;

// -------------------------------------------------------------------------------------------------

/// Number of voices in the synth's voice pool.
pub const MAX_VOICES: usize = 8;

// -------------------------------------------------------------------------------------------------

/// A real-time granular synth, which turns a single sample into a polyphonic instrument.
///
/// All voices and grains are allocated when creating the synth. Rendering, advancing and note
/// handling never allocate, lock or fail: exhausted pools silently drop notes or grains.
///
/// Hosts which own the synth in their audio thread either call [`Self::render_channel`] for
/// each channel and then [`Self::advance`] once for every output frame, or let
/// [`Self::process`] do this for interleaved output blocks. Other threads control the synth
/// via [`SynthHandle`]s.
pub struct GranularSynth {
    voices: Box<[GranularVoice; MAX_VOICES]>,
    sample: Option<SampleBuffer>,
    window_start: f64,
    window_end: f64,
    parameters: SynthParameters,
    sample_rate: u32,
    message_queue: Arc<ArrayQueue<SynthMessage>>,
}

impl GranularSynth {
    /// Create a new synth which plays the given sample at the given output sample rate.
    ///
    /// The sample play window initially covers the whole sample. Synths without a sample
    /// render silence and ignore note ons.
    pub fn new(
        sample: Option<SampleBuffer>,
        sample_rate: u32,
        parameters: SynthParameters,
    ) -> Result<Self, Error> {
        parameters.validate()?;
        if sample_rate == 0 {
            return Err(Error::ParameterError(
                "synth sample rate must not be zero".to_string(),
            ));
        }
        let voices = Box::new(std::array::from_fn(|index| match parameters.seed {
            Some(seed) => GranularVoice::with_seed(seed.wrapping_add(index as u64)),
            None => GranularVoice::new(),
        }));
        let (window_start, window_end) = (0.0, sample.as_ref().map_or(0.0, |s| s.duration()));
        let message_queue = Arc::new(ArrayQueue::new(message::MESSAGE_QUEUE_SIZE));
        log::debug!(
            "Created granular synth: {} Hz, sample window {:.3}..{:.3} s",
            sample_rate,
            window_start,
            window_end
        );
        Ok(Self {
            voices,
            sample,
            window_start,
            window_end,
            parameters,
            sample_rate,
            message_queue,
        })
    }

    /// Output sample rate of the synth.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The synth's sample buffer, if any.
    pub fn sample(&self) -> Option<&SampleBuffer> {
        self.sample.as_ref()
    }

    /// Current parameters.
    pub fn parameters(&self) -> &SynthParameters {
        &self.parameters
    }

    /// Current sample play window in seconds.
    pub fn window(&self) -> (f64, f64) {
        (self.window_start, self.window_end)
    }

    /// All voices, including free ones.
    pub fn voices(&self) -> impl Iterator<Item = &GranularVoice> {
        self.voices.iter()
    }

    /// Number of voices which are currently playing or releasing.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_free()).count()
    }

    /// Create a new handle to control the synth from other threads.
    pub fn handle(&self) -> SynthHandle {
        SynthHandle::new(Arc::clone(&self.message_queue))
    }

    /// Start a new note in the first free voice. Does nothing when no voice is free or when
    /// the synth has no sample.
    ///
    /// `pitch` is a linear pitch ratio (1.0 = original pitch), which gets offset by the
    /// synth's tuning parameter.
    pub fn note_on(&mut self, id: u32, pitch: f32, velocity: f32) {
        if self.sample.is_none() {
            return;
        }
        let Some(voice) = self.voices.iter_mut().find(|v| v.is_free()) else {
            return;
        };
        let parameters = &self.parameters;
        voice.start(
            id,
            VoiceNoteSettings {
                pitch: pitch + parameters.tuning,
                velocity,
            },
            VoiceGrainSettings {
                grains_per_second: parameters.grains_per_second,
                size: self.window_end - self.window_start,
                smoothness: parameters.grain_smoothness,
                position: self.window_start,
                play_mode: parameters.play_mode,
            },
            VoiceRandomSettings {
                size_random: parameters.size_random,
                position_offset_random: parameters.position_offset_random,
            },
            parameters.envelope,
        );
    }

    /// Release all gated voices which play the given note id. Voices which already got
    /// released and unknown ids are ignored.
    pub fn note_off(&mut self, id: u32) {
        for voice in self.voices.iter_mut() {
            if voice.id() == id && voice.state() == VoiceState::Gated {
                voice.gate(false);
            }
        }
    }

    /// Release all gated voices.
    pub fn all_notes_off(&mut self) {
        for voice in self.voices.iter_mut() {
            if voice.state() == VoiceState::Gated {
                voice.gate(false);
            }
        }
    }

    /// Move all voices forward by one sample. Call once per output frame, after all
    /// channels of the frame got rendered.
    pub fn advance(&mut self) {
        for voice in self.voices.iter_mut() {
            voice.advance(self.sample_rate);
        }
    }

    /// Sum of all active voices for the given output channel at the current frame.
    pub fn render_channel(&self, channel: usize) -> f32 {
        let Some(sample) = &self.sample else {
            return 0.0;
        };
        let interpolation = self.parameters.interpolation;
        self.voices
            .iter()
            .filter(|v| !v.is_free())
            .map(|v| v.render_channel(sample, channel, interpolation))
            .sum()
    }

    /// Render the given interleaved output buffer: applies all pending messages, then renders
    /// all channels and advances the synth for every frame.
    ///
    /// A trailing partial frame is cleared but not rendered.
    pub fn process(&mut self, output: &mut [f32], channel_count: usize) {
        self.process_messages();
        if channel_count == 0 {
            output.fill(0.0);
            return;
        }
        let mut frames = output.chunks_exact_mut(channel_count);
        for frame in &mut frames {
            for (channel, value) in frame.iter_mut().enumerate() {
                *value = self.render_channel(channel);
            }
            self.advance();
        }
        frames.into_remainder().fill(0.0);
    }

    /// Apply all pending messages which got sent via [`SynthHandle`]s.
    pub fn process_messages(&mut self) {
        while let Some(message) = self.message_queue.pop() {
            match message {
                SynthMessage::NoteOn {
                    id,
                    pitch,
                    velocity,
                } => self.note_on(id, pitch, velocity),
                SynthMessage::NoteOff { id } => self.note_off(id),
                SynthMessage::AllNotesOff => self.all_notes_off(),
                SynthMessage::SetWindow { start, end } => self.set_window(start, end),
                SynthMessage::SetParameter { id, value } => self.set_parameter(id, value),
            }
        }
    }

    /// Set the sample play window in seconds, which new voices use as grain position and
    /// size. The window is clamped to the sample's duration.
    pub fn set_window(&mut self, start: f64, end: f64) {
        let duration = self.sample.as_ref().map_or(0.0, |s| s.duration());
        let clamp = |time: f64| {
            if time.is_nan() {
                0.0
            } else {
                time.clamp(0.0, duration)
            }
        };
        let (start, end) = (clamp(start), clamp(end));
        (self.window_start, self.window_end) = (start.min(end), start.max(end));
        log::debug!(
            "Sample window changed to {:.3}..{:.3} s",
            self.window_start,
            self.window_end
        );
    }

    /// Apply a parameter update, see [`SynthParameters::all_parameters`].
    /// Changes apply to all notes which start after the update.
    pub fn set_parameter(&mut self, id: FourCC, value: ParameterValueUpdate) {
        if !self.parameters.apply_update(id, value) {
            log::warn!("Ignoring invalid parameter update '{id}': {value:?}");
        }
    }

    pub fn set_grains_per_second(&mut self, grains_per_second: u32) {
        self.set_parameter(
            SynthParameters::GRAINS_PER_SECOND.id(),
            ParameterValueUpdate::Plain(grains_per_second as f32),
        );
    }

    pub fn set_grain_smoothness(&mut self, smoothness: f32) {
        self.set_parameter(
            SynthParameters::GRAIN_SMOOTHNESS.id(),
            ParameterValueUpdate::Plain(smoothness),
        );
    }

    /// Set the max random grain size offset in seconds.
    pub fn set_size_random(&mut self, size_random: f64) {
        self.set_parameter(
            SynthParameters::SIZE_RANDOM.id(),
            ParameterValueUpdate::Plain(size_random as f32),
        );
    }

    /// Set the max random position offset, relative to the grain size.
    pub fn set_position_offset_random(&mut self, position_offset_random: f32) {
        self.set_parameter(
            SynthParameters::POSITION_RANDOM.id(),
            ParameterValueUpdate::Plain(position_offset_random),
        );
    }

    pub fn set_tuning(&mut self, tuning: f32) {
        self.set_parameter(SynthParameters::TUNING.id(), ParameterValueUpdate::Plain(tuning));
    }

    pub fn set_play_mode(&mut self, play_mode: GrainPlayMode) {
        self.parameters.play_mode = play_mode;
    }

    pub fn set_interpolation(&mut self, interpolation: SampleInterpolation) {
        self.parameters.interpolation = interpolation;
    }

    pub fn set_envelope_parameters(&mut self, envelope: AdsrParameters) {
        self.parameters.envelope = envelope;
    }

    /// Immediately silence all voices and release the sample.
    pub fn shutdown(&mut self) {
        for voice in self.voices.iter_mut() {
            voice.reset();
        }
        while self.message_queue.pop().is_some() {}
        self.sample = None;
        self.window_start = 0.0;
        self.window_end = 0.0;
        log::debug!("Granular synth shut down");
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const SAMPLE_RATE: u32 = 1000;

    fn sample() -> SampleBuffer {
        // 2 seconds of a constant mono signal
        SampleBuffer::from_interleaved(vec![0.5; 2 * SAMPLE_RATE as usize], 1, SAMPLE_RATE)
            .unwrap()
    }

    fn synth() -> GranularSynth {
        let envelope = AdsrParameters::new(
            Duration::from_millis(10),
            Duration::ZERO,
            1.0,
            Duration::from_millis(10),
        )
        .unwrap();
        let parameters = SynthParameters::default().envelope(envelope).seed(0);
        GranularSynth::new(Some(sample()), SAMPLE_RATE, parameters).unwrap()
    }

    #[test]
    fn invalid_construction() {
        assert!(GranularSynth::new(Some(sample()), 0, SynthParameters::default()).is_err());
        assert!(GranularSynth::new(
            None,
            SAMPLE_RATE,
            SynthParameters::default().grains_per_second(0)
        )
        .is_err());
    }

    #[test]
    fn window() {
        let mut synth = synth();
        assert_eq!(synth.window(), (0.0, 2.0));
        synth.set_window(1.5, 0.5);
        assert_eq!(synth.window(), (0.5, 1.5));
        synth.set_window(-1.0, 10.0);
        assert_eq!(synth.window(), (0.0, 2.0));
    }

    #[test]
    fn note_on_applies_tuning_and_window() {
        let mut synth = synth();
        synth.set_tuning(0.25);
        synth.set_window(0.5, 1.0);
        synth.note_on(7, 1.0, 0.8);
        let voice = synth.voices().find(|v| !v.is_free()).unwrap();
        assert_eq!(voice.id(), 7);
        assert_eq!(voice.note_settings().pitch, 1.25);
        assert_eq!(voice.note_settings().velocity, 0.8);
        assert_eq!(voice.grain_settings().position, 0.5);
        assert_eq!(voice.grain_settings().size, 0.5);
    }

    #[test]
    fn setters_clamp() {
        let mut synth = synth();
        synth.set_grains_per_second(1000);
        synth.set_grain_smoothness(-1.0);
        synth.set_tuning(5.0);
        synth.set_size_random(2.0);
        assert_eq!(synth.parameters().grains_per_second, 100);
        assert_eq!(synth.parameters().grain_smoothness, 0.0);
        assert_eq!(synth.parameters().tuning, 1.0);
        assert_eq!(synth.parameters().size_random, 1.0);
        assert!(synth.parameters().validate().is_ok());
    }

    #[test]
    fn no_sample_renders_silence() {
        let mut synth = GranularSynth::new(None, SAMPLE_RATE, SynthParameters::default()).unwrap();
        synth.note_on(1, 1.0, 1.0);
        assert_eq!(synth.active_voice_count(), 0);
        let mut output = [1.0; 64];
        synth.process(&mut output, 2);
        assert!(output.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn partial_frames_get_cleared() {
        let mut synth = synth();
        synth.note_on(1, 1.0, 1.0);
        let mut output = [f32::NAN; 2 * 50 + 1];
        synth.process(&mut output, 2);
        assert!(output[..100].iter().all(|v| v.is_finite()));
        assert!(output[..100].iter().any(|v| *v > 0.0));
        assert_eq!(output[100], 0.0);

        let mut output = [1.0; 8];
        synth.process(&mut output, 0);
        assert!(output.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn shutdown_silences() {
        let mut synth = synth();
        synth.note_on(1, 1.0, 1.0);
        synth.advance();
        assert_eq!(synth.active_voice_count(), 1);
        synth.shutdown();
        assert_eq!(synth.active_voice_count(), 0);
        assert!(synth.sample().is_none());
        assert_eq!(synth.render_channel(0), 0.0);
        synth.note_on(2, 1.0, 1.0);
        assert_eq!(synth.active_voice_count(), 0);
    }
}
