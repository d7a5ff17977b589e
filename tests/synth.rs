use std::time::Duration;

use granular_synth::{
    parameters::{Parameter, ParameterValueUpdate},
    AdsrParameters, GrainPlayMode, GranularSynth, SampleBuffer, SynthParameters, VoiceState,
    MAX_VOICES,
};

// -------------------------------------------------------------------------------------------------

const SAMPLE_RATE: u32 = 1000;

fn ramp_sample() -> SampleBuffer {
    // 1 second mono ramp from 0 to 1
    let frames = SAMPLE_RATE as usize;
    let samples = (0..frames).map(|f| f as f32 / frames as f32).collect();
    SampleBuffer::from_interleaved(samples, 1, SAMPLE_RATE).unwrap()
}

fn short_envelope() -> AdsrParameters {
    AdsrParameters::new(
        Duration::from_millis(10),
        Duration::ZERO,
        1.0,
        Duration::from_millis(10),
    )
    .unwrap()
}

fn new_synth(parameters: SynthParameters) -> GranularSynth {
    let mut synth = GranularSynth::new(Some(ramp_sample()), SAMPLE_RATE, parameters).unwrap();
    // 20 ms grains
    synth.set_window(0.4, 0.42);
    synth
}

fn run(synth: &mut GranularSynth, frames: usize) -> Vec<f32> {
    let mut output = vec![0.0; frames];
    synth.process(&mut output, 1);
    output
}

// -------------------------------------------------------------------------------------------------

#[test]
fn voice_pool_exhaustion() {
    let mut synth = new_synth(SynthParameters::default().seed(1));
    for id in 0..MAX_VOICES as u32 {
        synth.note_on(id, 1.0, 1.0);
    }
    assert_eq!(synth.active_voice_count(), MAX_VOICES);

    // no free voice left: the note gets dropped
    synth.note_on(100, 1.0, 1.0);
    assert_eq!(synth.active_voice_count(), MAX_VOICES);
    assert!(synth.voices().all(|v| v.id() != 100));
}

#[test]
fn released_voices_get_reused() {
    let mut synth = new_synth(
        SynthParameters::default()
            .envelope(short_envelope())
            .seed(2),
    );
    for id in 0..MAX_VOICES as u32 {
        synth.note_on(id, 1.0, 1.0);
    }
    run(&mut synth, 100);

    synth.note_off(3);
    assert_eq!(
        synth.voices().filter(|v| v.state() == VoiceState::Gated).count(),
        MAX_VOICES - 1
    );
    // release plus the last grain's tail
    run(&mut synth, 100);
    assert_eq!(synth.active_voice_count(), MAX_VOICES - 1);

    synth.note_on(100, 1.0, 1.0);
    assert_eq!(synth.active_voice_count(), MAX_VOICES);
    assert!(synth.voices().any(|v| v.id() == 100));
}

#[test]
fn note_off_with_unknown_id() {
    let mut synth = new_synth(SynthParameters::default().seed(3));
    synth.note_on(1, 1.0, 1.0);
    synth.note_on(2, 1.0, 1.0);
    synth.note_off(42);
    assert_eq!(synth.active_voice_count(), 2);
    assert_eq!(
        synth.voices().filter(|v| v.state() == VoiceState::Gated).count(),
        2
    );
    // repeated note offs are ignored
    synth.note_off(1);
    synth.note_off(1);
    assert_eq!(
        synth.voices().filter(|v| v.state() == VoiceState::Gated).count(),
        1
    );
}

#[test]
fn full_release_silences() {
    let mut synth = new_synth(
        SynthParameters::default()
            .envelope(short_envelope())
            .seed(4),
    );
    synth.note_on(1, 1.0, 1.0);
    let gated = run(&mut synth, 200);
    assert!(gated.iter().any(|v| *v > 0.0));

    synth.all_notes_off();
    run(&mut synth, 200);
    assert_eq!(synth.active_voice_count(), 0);
    let released = run(&mut synth, 100);
    assert!(released.iter().all(|v| *v == 0.0));
}

#[test]
fn handle_messages_apply_at_block_start() {
    let mut synth = new_synth(SynthParameters::default().seed(5));
    let handle = synth.handle();

    handle.note_on(1, 1.0, 1.0).unwrap();
    handle
        .set_parameter(
            SynthParameters::GRAINS_PER_SECOND.id(),
            ParameterValueUpdate::Plain(50.0),
        )
        .unwrap();
    handle.set_window(0.1, 0.2).unwrap();
    assert_eq!(synth.active_voice_count(), 0);
    assert_eq!(synth.parameters().grains_per_second, 10);

    // stereo output: the mono sample gets mapped to both channels
    let mut output = vec![0.0; 2 * 100];
    synth.process(&mut output, 2);
    assert_eq!(synth.active_voice_count(), 1);
    assert_eq!(synth.parameters().grains_per_second, 50);
    assert_eq!(synth.window(), (0.1, 0.2));
    for frame in output.chunks_exact(2) {
        assert_eq!(frame[0], frame[1]);
    }
    assert!(output.iter().any(|v| *v > 0.0));
}

#[test]
fn invalid_parameter_updates_are_ignored() {
    let mut synth = new_synth(SynthParameters::default().seed(6));
    let handle = synth.handle();
    handle
        .set_parameter(
            SynthParameters::PLAY_MODE.id(),
            ParameterValueUpdate::Plain(GrainPlayMode::Reverse as u8 as f32),
        )
        .unwrap();
    handle
        .set_parameter(
            SynthParameters::PLAY_MODE.id(),
            ParameterValueUpdate::Plain(12.0),
        )
        .unwrap();
    handle
        .set_parameter(four_cc::FourCC(*b"NOPE"), ParameterValueUpdate::Plain(1.0))
        .unwrap();
    run(&mut synth, 1);
    assert_eq!(synth.parameters().play_mode, GrainPlayMode::Reverse);
}

#[test]
fn seeded_synths_render_identically() {
    let parameters = SynthParameters::default()
        .grains_per_second(40)
        .size_random(0.01)
        .position_offset_random(0.5)
        .seed(0x5EED);
    let mut a = new_synth(parameters);
    let mut b = new_synth(parameters);
    a.note_on(1, 1.0, 1.0);
    b.note_on(1, 1.0, 1.0);
    assert_eq!(run(&mut a, 500), run(&mut b, 500));
}

#[test]
fn reverse_grains_read_backwards() {
    // one grain per second, so only a single grain plays in the first 20 ms
    let parameters = SynthParameters::default()
        .grains_per_second(1)
        .grain_smoothness(0.0)
        .envelope(
            AdsrParameters::new(Duration::ZERO, Duration::ZERO, 1.0, Duration::ZERO).unwrap(),
        )
        .seed(7);

    let mut forward = new_synth(parameters);
    forward.note_on(1, 1.0, 1.0);
    let output = run(&mut forward, 15);
    assert!(output[5] < output[10]);

    let mut reverse = new_synth(parameters.play_mode(GrainPlayMode::Reverse));
    reverse.note_on(1, 1.0, 1.0);
    let output = run(&mut reverse, 15);
    assert!(output[5] > output[10]);
}
