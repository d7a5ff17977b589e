#![doc = include_str!("../README.md")]

// private mods (will be partly re-exported)
mod curve;
mod envelope;
mod error;
mod grain;
mod output;
mod parameter;
mod sample;
mod synth;
mod voice;

// public, flat re-exports
pub use error::Error;

pub use curve::{tunable_sigmoid, Curve, CurvePoint, MAX_CURVE_POINTS};
pub use envelope::{AdsrEnvelope, AdsrParameters, AdsrStage};
pub use grain::{Grain, GrainPlayMode, GrainSettings, GrainState};
pub use sample::{SampleBuffer, SampleInterpolation};
pub use synth::{GranularSynth, SynthHandle, SynthMessage, SynthParameters, MAX_VOICES};
pub use voice::{
    GranularVoice, VoiceGrainSettings, VoiceNoteSettings, VoiceRandomSettings, VoiceState,
    MAX_GRAINS_PER_VOICE,
};

// public mods
pub mod utils;

pub mod parameters {
    //! Parameter descriptors of the synth, e.g. to build UIs or to automate the synth.

    pub use super::parameter::{
        EnumParameter, FloatParameter, IntegerParameter, Parameter, ParameterType,
        ParameterValueUpdate,
    };
}

pub mod outputs {
    //! Real-time and offline render hosts for a [`GranularSynth`](super::GranularSynth).

    #[cfg(feature = "cpal-output")]
    pub use super::output::{cpal::CpalOutput, AudioHostId};

    #[cfg(feature = "wav-output")]
    pub use super::output::wav::WavOutput;
}
