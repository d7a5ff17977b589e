//! A single, windowed read of a sample buffer: the atomic unit of the granular synth.

use crate::{
    curve::{mix, tunable_sigmoid},
    sample::{SampleBuffer, SampleInterpolation},
};

// -------------------------------------------------------------------------------------------------

/// Playback direction of a grain within its sample window.
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
pub enum GrainPlayMode {
    /// Play from the grain's start to its end.
    #[default]
    Forward,
    /// Play from the grain's end to its start.
    Reverse,
    /// Play forward, then back again. Ping pong grains last twice as long.
    PingPong,
}

impl GrainPlayMode {
    /// Map a grain's normalized progress to a read position fraction within the grain.
    #[inline]
    pub fn time_factor(self, ntime: f64) -> f64 {
        match self {
            GrainPlayMode::Forward => ntime,
            GrainPlayMode::Reverse => 1.0 - ntime,
            GrainPlayMode::PingPong => {
                let t = ntime % 2.0;
                if t > 1.0 {
                    2.0 - t
                } else {
                    t
                }
            }
        }
    }

    /// Returns true when a grain with the given normalized progress reached its end.
    #[inline]
    pub fn is_finished_at(self, ntime: f64) -> bool {
        match self {
            GrainPlayMode::Forward | GrainPlayMode::Reverse => ntime >= 1.0,
            GrainPlayMode::PingPong => ntime >= 2.0,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Lifecycle state of a [`Grain`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum GrainState {
    /// Never played.
    #[default]
    Idle,
    Playing,
    /// Played to its end. Can be reused.
    Finished,
}

// -------------------------------------------------------------------------------------------------

/// Start settings for a [`Grain`], resolved by the voice which spawns it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrainSettings {
    /// Grain length in seconds.
    pub size: f64,
    /// Start offset in the sample buffer in seconds.
    pub position: f64,
    /// Linear playback speed ratio (1.0 = original pitch).
    pub pitch: f32,
    pub velocity: f32,
    /// Window smoothness in range [0.0, 1.0].
    pub smoothness: f32,
    pub play_mode: GrainPlayMode,
}

// -------------------------------------------------------------------------------------------------

/// A single grain: a time bounded, windowed read of the sample buffer at a given pitch and
/// position.
///
/// Grains live in fixed slots of a voice's grain pool and get reused once they are free.
#[derive(Debug, Clone, Copy)]
pub struct Grain {
    size: f64,
    position: f64,
    pitch: f32,
    velocity: f32,
    time: f64,
    computed_amplitude: f32,
    computed_pitch: f32,
    computed_time: f64,
    play_mode: GrainPlayMode,
    smoothness: f32,
    state: GrainState,
}

impl Default for Grain {
    fn default() -> Self {
        Self::new()
    }
}

impl Grain {
    /// Shape of the window's fade in and fade out, see [`tunable_sigmoid`].
    pub const WINDOW_SHAPE: f32 = -0.5;
    /// Window amplitude at the very end of the grain.
    pub const WINDOW_FLOOR: f32 = 0.01;
    /// Shortest allowed grain size in seconds.
    pub const MIN_SIZE: f64 = 0.001;
    /// Lowest allowed playback speed.
    pub const MIN_PITCH: f32 = 0.01;

    /// Create a new idle grain.
    pub const fn new() -> Self {
        Self {
            size: 0.1,
            position: 0.0,
            pitch: 1.0,
            velocity: 1.0,
            time: 0.0,
            computed_amplitude: 0.0,
            computed_pitch: 0.0,
            computed_time: 0.0,
            play_mode: GrainPlayMode::Forward,
            smoothness: 1.0,
            state: GrainState::Idle,
        }
    }

    /// Grain length in seconds.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Start offset in the sample buffer in seconds.
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn play_mode(&self) -> GrainPlayMode {
        self.play_mode
    }

    pub fn smoothness(&self) -> f32 {
        self.smoothness
    }

    pub fn state(&self) -> GrainState {
        self.state
    }

    /// Current window amplitude, including velocity.
    pub fn amplitude(&self) -> f32 {
        self.computed_amplitude
    }

    /// Current read position in seconds, relative to the grain's start position.
    pub fn playback_time(&self) -> f64 {
        self.computed_time
    }

    /// Normalized progress of the grain. Ranges up to 2.0 for ping pong grains.
    pub fn progress(&self) -> f64 {
        self.time / self.size
    }

    /// True when the grain slot can be reused.
    #[inline(always)]
    pub fn is_free(&self) -> bool {
        matches!(self.state, GrainState::Idle | GrainState::Finished)
    }

    /// (Re)start the grain with the given settings.
    ///
    /// Sizes and pitches are clamped to [`Self::MIN_SIZE`] and [`Self::MIN_PITCH`], so grains
    /// always move forward in time and always end.
    pub fn start(&mut self, settings: GrainSettings) {
        self.size = settings.size.max(Self::MIN_SIZE);
        self.position = settings.position;
        self.pitch = settings.pitch.max(Self::MIN_PITCH);
        self.velocity = settings.velocity;
        self.smoothness = settings.smoothness;
        self.play_mode = settings.play_mode;
        self.time = 0.0;
        self.computed_amplitude = 0.0;
        self.computed_pitch = 0.0;
        self.computed_time = 0.0;
        self.state = GrainState::Playing;
    }

    /// Amplitude window at the given read position fraction `t` and smoothness.
    ///
    /// Smoothness defines symmetric fade zones of `smoothness / 2` at the start and end of
    /// the grain. The fade out does not fully reach zero but [`Self::WINDOW_FLOOR`].
    #[inline]
    pub fn window(smoothness: f32, t: f32) -> f32 {
        let factor = smoothness.clamp(0.0, 1.0) * 0.5;
        if factor <= 0.0 {
            1.0
        } else if t <= factor {
            let ratio = tunable_sigmoid(t / factor, Self::WINDOW_SHAPE);
            mix(0.0, 1.0, ratio)
        } else if t >= 1.0 - factor {
            let ratio = tunable_sigmoid((t - (1.0 - factor)) / factor, Self::WINDOW_SHAPE);
            mix(Self::WINDOW_FLOOR, 1.0, 1.0 - ratio)
        } else {
            1.0
        }
    }

    /// Compute the grain's amplitude and read position for the current time, then move time
    /// forward by one sample. Reaching the grain's end marks the grain as finished.
    pub fn update(&mut self, sample_rate: u32) {
        if self.state != GrainState::Playing {
            return;
        }
        self.computed_pitch = self.pitch;

        let ntime = self.time / self.size;
        let t = self.play_mode.time_factor(ntime);
        self.computed_amplitude = self.velocity * Self::window(self.smoothness, t as f32);
        self.computed_time = t * self.size;

        if self.play_mode.is_finished_at(ntime) {
            self.state = GrainState::Finished;
            self.computed_time = 0.0;
            self.time = 0.0;
        } else {
            self.time += self.computed_pitch as f64 / sample_rate as f64;
        }
    }

    /// Render the grain's current contribution to the given output channel.
    /// Returns 0 when the grain is not playing.
    #[inline]
    pub fn render_channel(
        &self,
        buffer: &SampleBuffer,
        channel: usize,
        interpolation: SampleInterpolation,
    ) -> f32 {
        if self.state != GrainState::Playing {
            return 0.0;
        }
        buffer.sample(channel, self.computed_time + self.position, interpolation)
            * self.computed_amplitude
    }
}

// -------------------------------------------------------------------------------------------------
