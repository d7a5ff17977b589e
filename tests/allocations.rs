#![cfg(all(debug_assertions, feature = "assert-allocs"))]

use assert_no_alloc::{assert_no_alloc, reset_violation_count, violation_count, AllocDisabler};

use granular_synth::{
    parameters::{Parameter, ParameterValueUpdate},
    GrainPlayMode, GranularSynth, SampleBuffer, SynthParameters,
};

// -------------------------------------------------------------------------------------------------

#[global_allocator]
static A: AllocDisabler = AllocDisabler;

// -------------------------------------------------------------------------------------------------

const SAMPLE_RATE: u32 = 1000;

#[test]
fn render_path_does_not_allocate() {
    let sample = SampleBuffer::from_interleaved(
        (0..2 * SAMPLE_RATE as usize).map(|f| (f % 100) as f32 / 100.0).collect(),
        2,
        SAMPLE_RATE,
    )
    .unwrap();
    let mut synth = GranularSynth::new(
        Some(sample),
        SAMPLE_RATE,
        SynthParameters::default()
            .grains_per_second(100)
            .size_random(0.01)
            .position_offset_random(0.5)
            .seed(1),
    )
    .unwrap();
    let handle = synth.handle();
    let mut output = vec![0.0; 2 * 256];

    // queued messages get applied in the render call
    handle.note_on(1, 1.0, 1.0).unwrap();
    handle.set_window(0.5, 0.6).unwrap();
    handle
        .set_parameter(
            SynthParameters::GRAIN_SMOOTHNESS.id(),
            ParameterValueUpdate::Plain(0.5),
        )
        .unwrap();
    handle
        .set_parameter(
            SynthParameters::PLAY_MODE.id(),
            ParameterValueUpdate::Plain(GrainPlayMode::PingPong as u8 as f32),
        )
        .unwrap();
    handle.note_off(1).unwrap();

    reset_violation_count();
    assert_no_alloc(|| {
        synth.process(&mut output, 2);
        synth.note_on(2, 1.5, 0.8);
        synth.note_on(3, 0.5, 0.8);
        synth.process(&mut output, 2);
        synth.note_off(2);
        synth.set_window(0.1, 0.3);
        synth.set_tuning(0.1);
        synth.process(&mut output, 2);
        synth.all_notes_off();
        synth.process(&mut output, 2);
    });
    assert_eq!(violation_count(), 0);
    assert!(output.iter().all(|v| v.is_finite()));
}
