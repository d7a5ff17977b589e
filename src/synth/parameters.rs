use std::time::Duration;

use four_cc::FourCC;
use strum::VariantNames;

use crate::{
    envelope::AdsrParameters,
    grain::GrainPlayMode,
    parameter::{EnumParameter, FloatParameter, IntegerParameter, Parameter, ParameterValueUpdate},
    sample::SampleInterpolation,
    Error,
};

// -------------------------------------------------------------------------------------------------

/// Configuration of a [`GranularSynth`](super::GranularSynth).
///
/// All values can also be changed at runtime, see [`SynthParameters::all_parameters`] for the
/// runtime parameter descriptors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthParameters {
    /// By default 10. Number of grains each voice spawns per second, in range `1..=100`.
    pub grains_per_second: u32,
    /// By default 1.0. Grain window smoothness in range `0.0..=1.0`: 0 plays grains without
    /// fades, 1 fades in over the first and out over the second half of the grain.
    pub grain_smoothness: f32,
    /// By default 0.0. Max random grain size offset in seconds, in range `0.0..=1.0`.
    pub size_random: f64,
    /// By default 0.0. Max random grain position offset in range `0.0..=1.0`, relative to
    /// the grain's size.
    pub position_offset_random: f32,
    /// By default 0.0. Offset that is added to all note pitch ratios, in range `-1.0..=1.0`.
    pub tuning: f32,
    /// By default [`GrainPlayMode::Forward`].
    pub play_mode: GrainPlayMode,
    /// By default [`SampleInterpolation::Cubic`].
    pub interpolation: SampleInterpolation,
    /// Amplitude envelope of all voices.
    pub envelope: AdsrParameters,
    /// By default None. When set, voice random generators are seeded from it, which makes
    /// renderings reproducible.
    pub seed: Option<u64>,
}

impl Default for SynthParameters {
    fn default() -> Self {
        Self {
            grains_per_second: Self::GRAINS_PER_SECOND.default_value() as u32,
            grain_smoothness: Self::GRAIN_SMOOTHNESS.default_value(),
            size_random: Self::SIZE_RANDOM.default_value() as f64,
            position_offset_random: Self::POSITION_RANDOM.default_value(),
            tuning: Self::TUNING.default_value(),
            play_mode: GrainPlayMode::default(),
            interpolation: SampleInterpolation::default(),
            envelope: AdsrParameters::default(),
            seed: None,
        }
    }
}

impl SynthParameters {
    pub const GRAINS_PER_SECOND: IntegerParameter =
        IntegerParameter::new(FourCC(*b"GRPS"), "Grains/Second", 1..=100, 10).with_unit("Hz");

    pub const GRAIN_SMOOTHNESS: FloatParameter =
        FloatParameter::new(FourCC(*b"GSMO"), "Smoothness", 0.0..=1.0, 1.0);

    pub const SIZE_RANDOM: FloatParameter =
        FloatParameter::new(FourCC(*b"GRSZ"), "Random Size", 0.0..=1.0, 0.0).with_unit("s");

    pub const POSITION_RANDOM: FloatParameter =
        FloatParameter::new(FourCC(*b"GRPO"), "Random Position", 0.0..=1.0, 0.0);

    pub const TUNING: FloatParameter =
        FloatParameter::new(FourCC(*b"TUNE"), "Tuning", -1.0..=1.0, 0.0);

    pub const PLAY_MODE: EnumParameter = EnumParameter::new(
        FourCC(*b"GDIR"),
        "Direction",
        GrainPlayMode::VARIANTS,
        GrainPlayMode::Forward as usize,
    );

    pub const INTERPOLATION: EnumParameter = EnumParameter::new(
        FourCC(*b"INTP"),
        "Interpolation",
        SampleInterpolation::VARIANTS,
        SampleInterpolation::Cubic as usize,
    );

    pub const AMP_ATTACK: FloatParameter =
        FloatParameter::new(FourCC(*b"AATK"), "Attack", 0.0..=10.0, 0.4).with_unit("s");

    pub const AMP_DECAY: FloatParameter =
        FloatParameter::new(FourCC(*b"ADCY"), "Decay", 0.0..=10.0, 0.0).with_unit("s");

    pub const AMP_SUSTAIN: FloatParameter =
        FloatParameter::new(FourCC(*b"ASTN"), "Sustain", 0.0..=1.0, 1.0);

    pub const AMP_RELEASE: FloatParameter =
        FloatParameter::new(FourCC(*b"AREL"), "Release", 0.0..=10.0, 1.0).with_unit("s");

    /// Descriptors of all runtime parameters.
    pub fn all_parameters() -> Vec<Box<dyn Parameter>> {
        vec![
            Self::GRAINS_PER_SECOND.into_box(),
            Self::GRAIN_SMOOTHNESS.into_box(),
            Self::SIZE_RANDOM.into_box(),
            Self::POSITION_RANDOM.into_box(),
            Self::TUNING.into_box(),
            Self::PLAY_MODE.into_box(),
            Self::INTERPOLATION.into_box(),
            Self::AMP_ATTACK.into_box(),
            Self::AMP_DECAY.into_box(),
            Self::AMP_SUSTAIN.into_box(),
            Self::AMP_RELEASE.into_box(),
        ]
    }

    pub fn grains_per_second(mut self, grains_per_second: u32) -> Self {
        self.grains_per_second = grains_per_second;
        self
    }

    pub fn grain_smoothness(mut self, smoothness: f32) -> Self {
        self.grain_smoothness = smoothness;
        self
    }

    pub fn size_random(mut self, size_random: f64) -> Self {
        self.size_random = size_random;
        self
    }

    pub fn position_offset_random(mut self, position_offset_random: f32) -> Self {
        self.position_offset_random = position_offset_random;
        self
    }

    pub fn tuning(mut self, tuning: f32) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn play_mode(mut self, play_mode: GrainPlayMode) -> Self {
        self.play_mode = play_mode;
        self
    }

    pub fn interpolation(mut self, interpolation: SampleInterpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn envelope(mut self, envelope: AdsrParameters) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate all parameters. Returns Error::ParameterError on errors.
    pub fn validate(&self) -> Result<(), Error> {
        let grains_per_second = i32::try_from(self.grains_per_second).unwrap_or(i32::MAX);
        if !Self::GRAINS_PER_SECOND.range().contains(&grains_per_second) {
            return Err(Error::ParameterError(format!(
                "synth parameters 'grains_per_second' value is '{}'",
                self.grains_per_second
            )));
        }
        let float_values = [
            (&Self::GRAIN_SMOOTHNESS, "grain_smoothness", self.grain_smoothness),
            (&Self::SIZE_RANDOM, "size_random", self.size_random as f32),
            (
                &Self::POSITION_RANDOM,
                "position_offset_random",
                self.position_offset_random,
            ),
            (&Self::TUNING, "tuning", self.tuning),
            (
                &Self::AMP_ATTACK,
                "envelope attack",
                self.envelope.attack_time().as_secs_f32(),
            ),
            (
                &Self::AMP_DECAY,
                "envelope decay",
                self.envelope.decay_time().as_secs_f32(),
            ),
            (
                &Self::AMP_RELEASE,
                "envelope release",
                self.envelope.release_time().as_secs_f32(),
            ),
        ];
        for (descriptor, name, value) in float_values {
            if value.is_nan() || !descriptor.range().contains(&value) {
                return Err(Error::ParameterError(format!(
                    "synth parameters '{}' value is '{}'",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Apply a runtime parameter update. Values are clamped into the parameter's range.
    ///
    /// Returns false when the parameter id or the value is unknown.
    pub(crate) fn apply_update(&mut self, id: FourCC, update: ParameterValueUpdate) -> bool {
        match id {
            _ if id == Self::GRAINS_PER_SECOND.id() => {
                self.grains_per_second = Self::GRAINS_PER_SECOND.value_from_update(update) as u32;
            }
            _ if id == Self::GRAIN_SMOOTHNESS.id() => {
                self.grain_smoothness = Self::GRAIN_SMOOTHNESS.value_from_update(update);
            }
            _ if id == Self::SIZE_RANDOM.id() => {
                self.size_random = Self::SIZE_RANDOM.value_from_update(update) as f64;
            }
            _ if id == Self::POSITION_RANDOM.id() => {
                self.position_offset_random = Self::POSITION_RANDOM.value_from_update(update);
            }
            _ if id == Self::TUNING.id() => {
                self.tuning = Self::TUNING.value_from_update(update);
            }
            _ if id == Self::PLAY_MODE.id() => {
                let Some(play_mode) = Self::PLAY_MODE
                    .index_from_update(update)
                    .and_then(|index| GrainPlayMode::from_repr(index as u8))
                else {
                    return false;
                };
                self.play_mode = play_mode;
            }
            _ if id == Self::INTERPOLATION.id() => {
                let Some(interpolation) = Self::INTERPOLATION
                    .index_from_update(update)
                    .and_then(|index| SampleInterpolation::from_repr(index as u8))
                else {
                    return false;
                };
                self.interpolation = interpolation;
            }
            _ if id == Self::AMP_ATTACK.id() => {
                let seconds = Self::AMP_ATTACK.value_from_update(update);
                self.envelope.set_attack_time(Duration::from_secs_f32(seconds));
            }
            _ if id == Self::AMP_DECAY.id() => {
                let seconds = Self::AMP_DECAY.value_from_update(update);
                self.envelope.set_decay_time(Duration::from_secs_f32(seconds));
            }
            _ if id == Self::AMP_SUSTAIN.id() => {
                let level = Self::AMP_SUSTAIN.value_from_update(update);
                if self.envelope.set_sustain_level(level).is_err() {
                    return false;
                }
            }
            _ if id == Self::AMP_RELEASE.id() => {
                let seconds = Self::AMP_RELEASE.value_from_update(update);
                self.envelope.set_release_time(Duration::from_secs_f32(seconds));
            }
            _ => return false,
        }
        true
    }
}

// -------------------------------------------------------------------------------------------------
