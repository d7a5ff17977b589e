//! A single polyphonic note of the granular synth: a fixed grain pool plus an amplitude envelope.

use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    envelope::{AdsrEnvelope, AdsrParameters},
    grain::{Grain, GrainPlayMode, GrainSettings},
    sample::{SampleBuffer, SampleInterpolation},
};

// -------------------------------------------------------------------------------------------------

/// Number of grain slots in each voice.
pub const MAX_GRAINS_PER_VOICE: usize = 32;

// -------------------------------------------------------------------------------------------------

/// Coarse gate state of a [`GranularVoice`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum VoiceState {
    /// Not gated: either free or releasing.
    #[default]
    Idle,
    /// Gated: holding a note and spawning grains.
    Gated,
}

// -------------------------------------------------------------------------------------------------

/// Grain spawn settings of a [`GranularVoice`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceGrainSettings {
    pub grains_per_second: u32,
    /// Grain size in seconds.
    pub size: f64,
    pub smoothness: f32,
    /// Grain start position in the sample buffer in seconds.
    pub position: f64,
    pub play_mode: GrainPlayMode,
}

impl Default for VoiceGrainSettings {
    fn default() -> Self {
        Self {
            grains_per_second: 10,
            size: 0.1,
            smoothness: 1.0,
            position: 0.0,
            play_mode: GrainPlayMode::Forward,
        }
    }
}

/// Note settings of a [`GranularVoice`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceNoteSettings {
    /// Linear pitch ratio (1.0 = original pitch).
    pub pitch: f32,
    pub velocity: f32,
}

impl Default for VoiceNoteSettings {
    fn default() -> Self {
        Self {
            pitch: 1.0,
            velocity: 1.0,
        }
    }
}

/// Random grain spawn jitter of a [`GranularVoice`].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct VoiceRandomSettings {
    /// Max random size offset in seconds.
    pub size_random: f64,
    /// Max random position offset, relative to the grain's size.
    pub position_offset_random: f32,
}

// -------------------------------------------------------------------------------------------------

/// A single note instance of the synth.
///
/// While gated, the voice periodically spawns grains into its fixed grain pool. Its output is
/// the sum of all playing grains, scaled by the voice's amplitude envelope. Gating off only
/// releases the envelope: playing grains keep playing until they reach their natural end.
#[derive(Debug, Clone)]
pub struct GranularVoice {
    id: u32,
    grains: [Grain; MAX_GRAINS_PER_VOICE],
    envelope: AdsrEnvelope,
    grain_settings: VoiceGrainSettings,
    note_settings: VoiceNoteSettings,
    random_settings: VoiceRandomSettings,
    grain_spawn_timer: f64,
    state: VoiceState,
    rng: SmallRng,
}

impl GranularVoice {
    /// Create a new free voice with an OS seeded random generator.
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_os_rng())
    }

    /// Create a new free voice with a deterministic random generator.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            id: 0,
            grains: [Grain::new(); MAX_GRAINS_PER_VOICE],
            envelope: AdsrEnvelope::new(),
            grain_settings: VoiceGrainSettings::default(),
            note_settings: VoiceNoteSettings::default(),
            random_settings: VoiceRandomSettings::default(),
            grain_spawn_timer: 0.0,
            state: VoiceState::Idle,
            rng,
        }
    }

    /// Id of the note which triggered the voice.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// The voice's amplitude envelope.
    pub fn envelope(&self) -> &AdsrEnvelope {
        &self.envelope
    }

    /// All grain slots, including free ones.
    pub fn grains(&self) -> &[Grain] {
        &self.grains
    }

    /// Number of grains which are currently playing.
    pub fn playing_grain_count(&self) -> usize {
        self.grains.iter().filter(|g| !g.is_free()).count()
    }

    pub fn grain_settings(&self) -> &VoiceGrainSettings {
        &self.grain_settings
    }

    pub fn note_settings(&self) -> &VoiceNoteSettings {
        &self.note_settings
    }

    pub fn random_settings(&self) -> &VoiceRandomSettings {
        &self.random_settings
    }

    /// A voice is free when its envelope finished and none of its grains is playing.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.envelope.is_idle() && self.grains.iter().all(Grain::is_free)
    }

    /// Reinitialize the voice for a new note and gate it on.
    ///
    /// The first grain spawns with the voice's next advance.
    pub fn start(
        &mut self,
        id: u32,
        note_settings: VoiceNoteSettings,
        grain_settings: VoiceGrainSettings,
        random_settings: VoiceRandomSettings,
        envelope_parameters: AdsrParameters,
    ) {
        self.id = id;
        self.note_settings = note_settings;
        self.grain_settings = grain_settings;
        self.grain_settings.grains_per_second = grain_settings.grains_per_second.max(1);
        self.random_settings = random_settings;
        self.grains = [Grain::new(); MAX_GRAINS_PER_VOICE];
        self.envelope.reset();
        self.envelope.set_parameters(envelope_parameters);
        self.grain_spawn_timer = self.spawn_interval();
        self.gate(true);
    }

    /// Gate the voice's envelope on or off.
    pub fn gate(&mut self, on: bool) {
        self.envelope.gate(on);
        self.state = if on {
            VoiceState::Gated
        } else {
            VoiceState::Idle
        };
    }

    /// Immediately silence the voice and all its grains.
    pub fn reset(&mut self) {
        self.grains = [Grain::new(); MAX_GRAINS_PER_VOICE];
        self.envelope.reset();
        self.grain_spawn_timer = 0.0;
        self.state = VoiceState::Idle;
    }

    /// Sum of all playing grains for the given channel, scaled by the envelope.
    pub fn render_channel(
        &self,
        buffer: &SampleBuffer,
        channel: usize,
        interpolation: SampleInterpolation,
    ) -> f32 {
        let mut output = 0.0;
        for grain in self.grains.iter().filter(|g| !g.is_free()) {
            output += grain.render_channel(buffer, channel, interpolation);
        }
        output * self.envelope.value()
    }

    /// Move the voice forward by one sample: spawn new grains when due, then update all
    /// playing grains and the envelope.
    pub fn advance(&mut self, sample_rate: u32) {
        if self.state == VoiceState::Gated {
            self.grain_spawn_timer += 1.0 / sample_rate as f64;
            if self.grain_spawn_timer >= self.spawn_interval() {
                self.grain_spawn_timer = 0.0;
                self.spawn_grain();
            }
        }

        for grain in self.grains.iter_mut().filter(|g| !g.is_free()) {
            grain.update(sample_rate);
        }

        self.envelope.update(sample_rate);
    }

    #[inline]
    fn spawn_interval(&self) -> f64 {
        1.0 / self.grain_settings.grains_per_second.max(1) as f64
    }

    /// Start a new grain in the first free grain slot, applying random size and position
    /// offsets. Does nothing when all slots are playing.
    fn spawn_grain(&mut self) {
        let Some(index) = self.grains.iter().position(Grain::is_free) else {
            return;
        };

        let random_size = (self.rng.random::<f64>() * 2.0 - 1.0) * self.random_settings.size_random;
        let size = self.grain_settings.size + random_size;

        // position jitter is relative to the already randomized size
        let offset = self.random_settings.position_offset_random as f64 * size;
        let random_position = (self.rng.random::<f64>() * 2.0 - 1.0) * offset;
        let position = self.grain_settings.position + random_position;

        self.grains[index].start(GrainSettings {
            size,
            position,
            pitch: self.note_settings.pitch,
            velocity: self.note_settings.velocity,
            smoothness: self.grain_settings.smoothness,
            play_mode: self.grain_settings.play_mode,
        });
    }
}

impl Default for GranularVoice {
    fn default() -> Self {
        Self::new()
    }
}

// -------------------------------------------------------------------------------------------------
