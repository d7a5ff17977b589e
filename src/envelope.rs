//! Four stage ADSR amplitude envelope with sigmoid shaped stages.

use std::time::Duration;

use crate::{
    curve::{mix, tunable_sigmoid},
    Error,
};

// -------------------------------------------------------------------------------------------------

/// Current processing stage in an [`AdsrEnvelope`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum AdsrStage {
    #[default]
    /// Before attack and after release (zero volume).
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

// -------------------------------------------------------------------------------------------------

/// ADSR envelope parameters that define the envelope shape of an [`AdsrEnvelope`].
///
/// Zero stage durations are valid: they get clamped to a tiny positive duration, so the
/// stage completes instantly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrParameters {
    attack_time: Duration,
    decay_time: Duration,
    sustain_level: f32,
    release_time: Duration,
}

impl Default for AdsrParameters {
    fn default() -> Self {
        Self {
            attack_time: Duration::from_millis(400),
            decay_time: Duration::ZERO,
            sustain_level: 1.0,
            release_time: Duration::from_secs(1),
        }
    }
}

impl AdsrParameters {
    /// Shape of all envelope stages, see [`tunable_sigmoid`].
    pub const STAGE_SHAPE: f32 = 0.5;

    /// Lower bound for stage durations in seconds.
    const MIN_STAGE_TIME: f64 = 1.0e-6;

    /// Create new ADSR parameters with the given stage durations and sustain level.
    ///
    /// sustain_level must be in range [0.0, 1.0].
    pub fn new(
        attack_time: Duration,
        decay_time: Duration,
        sustain_level: f32,
        release_time: Duration,
    ) -> Result<Self, Error> {
        let mut parameters = Self::default();
        parameters.set_attack_time(attack_time);
        parameters.set_decay_time(decay_time);
        parameters.set_sustain_level(sustain_level)?;
        parameters.set_release_time(release_time);
        Ok(parameters)
    }

    /// Get attack time duration.
    pub fn attack_time(&self) -> Duration {
        self.attack_time
    }
    /// Set the attack time duration. Attack can be zero to skip the attack phase.
    pub fn set_attack_time(&mut self, time: Duration) {
        self.attack_time = time;
    }

    /// Get decay time duration.
    pub fn decay_time(&self) -> Duration {
        self.decay_time
    }
    /// Set the decay time duration.
    pub fn set_decay_time(&mut self, time: Duration) {
        self.decay_time = time;
    }

    /// Get the sustain level.
    pub fn sustain_level(&self) -> f32 {
        self.sustain_level
    }
    /// Set the sustain level.
    pub fn set_sustain_level(&mut self, level: f32) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&level) {
            return Err(Error::ParameterError(format!(
                "Invalid sustain level: {}. Must be in range [0.0, 1.0]",
                level
            )));
        }
        self.sustain_level = level;
        Ok(())
    }

    /// Get release time duration.
    pub fn release_time(&self) -> Duration {
        self.release_time
    }
    /// Set the release time duration.
    pub fn set_release_time(&mut self, time: Duration) {
        self.release_time = time;
    }

    #[inline]
    fn stage_seconds(time: Duration) -> f64 {
        time.as_secs_f64().max(Self::MIN_STAGE_TIME)
    }
}

// -------------------------------------------------------------------------------------------------

/// ADSR amplitude envelope, gated by note on/off events.
///
/// Each stage tracks its normalized progress `t`, which is shaped with the
/// [`tunable_sigmoid`] (k = 0.5):
/// - Attack ramps from 0 to 1, then moves on to decay.
/// - Decay ramps from 1 to the sustain level, then moves on to sustain.
/// - Sustain holds the sustain level until the gate closes.
/// - Release ramps from the sustain level down to 0, then moves on to idle.
///
/// Gating on or off restarts the attack or release stage immediately from any stage.
#[derive(Debug, Default, Clone)]
pub struct AdsrEnvelope {
    parameters: AdsrParameters,
    stage: AdsrStage,
    time: f64,
    value: f32,
}

impl AdsrEnvelope {
    /// Create a new, idle envelope with default parameters.
    pub fn new() -> Self {
        Self::with_parameters(AdsrParameters::default())
    }

    /// Create a new, idle envelope with the given parameters.
    pub fn with_parameters(parameters: AdsrParameters) -> Self {
        Self {
            parameters,
            stage: AdsrStage::Idle,
            time: 0.0,
            value: 0.0,
        }
    }

    /// Return the envelope's current stage.
    #[inline(always)]
    pub fn stage(&self) -> AdsrStage {
        self.stage
    }

    /// Return the envelope's current output value.
    #[inline(always)]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Return true when the envelope is in its idle stage.
    #[inline(always)]
    pub fn is_idle(&self) -> bool {
        self.stage == AdsrStage::Idle
    }

    /// Access to the envelope's parameters.
    pub fn parameters(&self) -> &AdsrParameters {
        &self.parameters
    }

    /// Apply new parameters. Takes effect with the next update.
    pub fn set_parameters(&mut self, parameters: AdsrParameters) {
        self.parameters = parameters;
    }

    /// Open or close the gate: gate on restarts the attack stage from zero, gate off
    /// starts the release stage, without waiting for the current stage to finish.
    pub fn gate(&mut self, on: bool) {
        self.time = 0.0;
        if on {
            self.value = 0.0;
            self.stage = AdsrStage::Attack;
        } else {
            self.stage = AdsrStage::Release;
        }
    }

    /// Immediately stop the envelope and set state to Idle.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.value = 0.0;
        self.stage = AdsrStage::Idle;
    }

    /// Compute the current stage's value and move time forward by one sample.
    pub fn update(&mut self, sample_rate: u32) {
        let inv_sample_rate = 1.0 / sample_rate as f64;
        let sustain = self.parameters.sustain_level;
        match self.stage {
            AdsrStage::Idle => {
                self.value = 0.0;
                self.time = 0.0;
            }
            AdsrStage::Attack => {
                let t = self.stage_progress(self.parameters.attack_time);
                self.value = mix(0.0, 1.0, Self::shaped(t));
                if t >= 1.0 {
                    self.stage = AdsrStage::Decay;
                    self.time = 0.0;
                } else {
                    self.time += inv_sample_rate;
                }
            }
            AdsrStage::Decay => {
                let t = self.stage_progress(self.parameters.decay_time);
                self.value = mix(sustain, 1.0, Self::shaped(1.0 - t));
                if t >= 1.0 {
                    self.stage = AdsrStage::Sustain;
                } else {
                    self.time += inv_sample_rate;
                }
            }
            AdsrStage::Sustain => {
                self.value = sustain;
            }
            AdsrStage::Release => {
                let t = self.stage_progress(self.parameters.release_time);
                self.value = mix(0.0, sustain, Self::shaped(1.0 - t));
                if t >= 1.0 {
                    self.stage = AdsrStage::Idle;
                } else {
                    self.time += inv_sample_rate;
                }
            }
        }
    }

    /// Normalized progress of the current stage, clamped to [0, 1].
    #[inline]
    fn stage_progress(&self, stage_time: Duration) -> f32 {
        (self.time / AdsrParameters::stage_seconds(stage_time)).clamp(0.0, 1.0) as f32
    }

    #[inline]
    fn shaped(t: f32) -> f32 {
        tunable_sigmoid(t, AdsrParameters::STAGE_SHAPE)
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 1000;

    fn parameters(attack_ms: u64, decay_ms: u64, sustain: f32, release_ms: u64) -> AdsrParameters {
        AdsrParameters::new(
            Duration::from_millis(attack_ms),
            Duration::from_millis(decay_ms),
            sustain,
            Duration::from_millis(release_ms),
        )
        .unwrap()
    }

    fn run_until(env: &mut AdsrEnvelope, stage: AdsrStage, max_updates: usize) -> Option<usize> {
        for count in 1..=max_updates {
            env.update(SAMPLE_RATE);
            if env.stage() == stage {
                return Some(count);
            }
        }
        None
    }

    #[test]
    fn default_construction() {
        let env = AdsrEnvelope::new();
        assert_eq!(env.stage(), AdsrStage::Idle);
        assert_eq!(env.value(), 0.0);
        assert_eq!(env.parameters().sustain_level(), 1.0);
    }

    #[test]
    fn invalid_sustain() {
        assert!(AdsrParameters::new(Duration::ZERO, Duration::ZERO, 1.5, Duration::ZERO).is_err());
        assert!(AdsrParameters::new(Duration::ZERO, Duration::ZERO, -0.1, Duration::ZERO).is_err());
    }

    #[test]
    fn idle_stays_silent() {
        let mut env = AdsrEnvelope::new();
        for _ in 0..100 {
            env.update(SAMPLE_RATE);
            assert_eq!(env.value(), 0.0);
            assert_eq!(env.stage(), AdsrStage::Idle);
        }
    }

    #[test]
    fn gate_on_reaches_sustain() {
        let sustain = 0.6;
        let mut env = AdsrEnvelope::with_parameters(parameters(100, 50, sustain, 200));
        env.gate(true);
        assert_eq!(env.stage(), AdsrStage::Attack);

        // attack + decay = 150 ms = 150 samples, plus one update per stage transition
        let updates = run_until(&mut env, AdsrStage::Sustain, 160).expect("reaches sustain");
        assert!((150..=155).contains(&updates), "took {updates} updates");
        assert_eq!(env.value(), sustain);

        // sustain holds
        for _ in 0..100 {
            env.update(SAMPLE_RATE);
            assert_eq!(env.stage(), AdsrStage::Sustain);
            assert_eq!(env.value(), sustain);
        }
    }

    #[test]
    fn attack_and_decay_are_continuous() {
        let sustain = 0.5;
        let mut env = AdsrEnvelope::with_parameters(parameters(10, 10, sustain, 10));
        env.gate(true);
        let mut last_value = 0.0;
        while env.stage() != AdsrStage::Decay {
            env.update(SAMPLE_RATE);
            assert!(env.value() >= last_value, "attack rises");
            last_value = env.value();
        }
        assert_eq!(last_value, 1.0);
        while env.stage() != AdsrStage::Sustain {
            env.update(SAMPLE_RATE);
            assert!(env.value() <= last_value, "decay falls");
            assert!(env.value() >= sustain);
            last_value = env.value();
        }
        assert_eq!(last_value, sustain);
    }

    #[test]
    fn decay_falls_from_peak_to_sustain() {
        let sustain = 0.5;
        let mut env = AdsrEnvelope::with_parameters(parameters(10, 100, sustain, 10));
        env.gate(true);
        run_until(&mut env, AdsrStage::Decay, 20).expect("reaches decay");

        // t = 0: starts at the attack's peak
        env.update(SAMPLE_RATE);
        assert_eq!(env.value(), 1.0);

        // t = 0.5: mix(sustain, 1, shaped(0.5, 0.5) = 0.25)
        for _ in 0..50 {
            env.update(SAMPLE_RATE);
        }
        assert_eq!(env.stage(), AdsrStage::Decay);
        assert!((env.value() - 0.625).abs() < 1e-3, "value {}", env.value());
    }

    #[test]
    fn gate_off_reaches_idle() {
        let sustain = 0.8;
        let mut env = AdsrEnvelope::with_parameters(parameters(10, 10, sustain, 100));
        env.gate(true);
        run_until(&mut env, AdsrStage::Sustain, 100).expect("reaches sustain");

        env.gate(false);
        assert_eq!(env.stage(), AdsrStage::Release);
        let updates = run_until(&mut env, AdsrStage::Idle, 200).expect("reaches idle");
        // release = 100 ms = 100 samples, plus or minus one sample
        assert!((99..=102).contains(&updates), "took {updates} updates");
        assert_eq!(env.value(), 0.0);
    }

    #[test]
    fn retrigger_restarts_attack() {
        let mut env = AdsrEnvelope::with_parameters(parameters(50, 0, 1.0, 50));
        env.gate(true);
        for _ in 0..20 {
            env.update(SAMPLE_RATE);
        }
        assert!(env.value() > 0.0);
        env.gate(true);
        assert_eq!(env.stage(), AdsrStage::Attack);
        assert_eq!(env.value(), 0.0);
        env.update(SAMPLE_RATE);
        assert_eq!(env.value(), 0.0);
    }

    #[test]
    fn zero_stages_complete_instantly() {
        let mut env = AdsrEnvelope::with_parameters(parameters(0, 0, 0.7, 0));
        env.gate(true);
        let updates = run_until(&mut env, AdsrStage::Sustain, 10).expect("reaches sustain");
        assert!(updates <= 4, "took {updates} updates");
        assert!(env.value().is_finite());
        assert_eq!(env.value(), 0.7);

        env.gate(false);
        let updates = run_until(&mut env, AdsrStage::Idle, 10).expect("reaches idle");
        assert!(updates <= 2, "took {updates} updates");
        assert_eq!(env.value(), 0.0);
    }

    #[test]
    fn reset_goes_to_idle() {
        let mut env = AdsrEnvelope::new();
        env.gate(true);
        env.update(SAMPLE_RATE);
        env.reset();
        assert_eq!(env.stage(), AdsrStage::Idle);
        assert_eq!(env.value(), 0.0);
    }
}
