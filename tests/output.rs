#![cfg(feature = "wav-output")]

use std::{path::PathBuf, time::Duration};

use granular_synth::{
    outputs::WavOutput, Error, GranularSynth, SampleBuffer, SampleInterpolation, SynthParameters,
};

// -------------------------------------------------------------------------------------------------

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("granular-synth-{}-{}", std::process::id(), name))
}

fn sine_sample(sample_rate: u32) -> SampleBuffer {
    let samples = (0..sample_rate as usize)
        .map(|f| (f as f32 / sample_rate as f32 * 440.0 * std::f32::consts::TAU).sin() * 0.5)
        .collect();
    SampleBuffer::from_interleaved(samples, 1, sample_rate).unwrap()
}

// -------------------------------------------------------------------------------------------------

#[test]
fn decode_missing_file() {
    assert!(matches!(
        SampleBuffer::from_file(temp_path("missing.wav")),
        Err(Error::MediaFileNotFound)
    ));
}

#[test]
fn render_and_decode_wav() {
    const SAMPLE_RATE: u32 = 22050;
    let path = temp_path("render.wav");

    let mut synth = GranularSynth::new(
        Some(sine_sample(SAMPLE_RATE)),
        SAMPLE_RATE,
        SynthParameters::default()
            .interpolation(SampleInterpolation::Linear)
            .seed(1),
    )
    .unwrap();
    synth.set_window(0.2, 0.3);

    let mut output = WavOutput::open(&path, SAMPLE_RATE, 2).unwrap();
    // mismatching sample rates are rejected
    let mut other_synth =
        GranularSynth::new(None, SAMPLE_RATE * 2, SynthParameters::default()).unwrap();
    assert!(output
        .render(&mut other_synth, Duration::from_millis(10))
        .is_err());

    let handle = synth.handle();
    handle.note_on(1, 1.0, 1.0).unwrap();
    output.render(&mut synth, Duration::from_millis(500)).unwrap();
    handle.note_off(1).unwrap();
    output.render(&mut synth, Duration::from_millis(1500)).unwrap();
    assert_eq!(output.frames_written(), 2 * SAMPLE_RATE as u64);
    output.finalize().unwrap();
    assert!(output.render(&mut synth, Duration::from_millis(10)).is_err());

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.spec().sample_rate, SAMPLE_RATE);
    assert_eq!(reader.spec().bits_per_sample, 32);
    assert_eq!(reader.duration(), 2 * SAMPLE_RATE);
    drop(reader);

    // decode the rendered file again as new sample
    let decoded = SampleBuffer::from_file(&path).unwrap();
    assert_eq!(decoded.channel_count(), 2);
    assert_eq!(decoded.sample_rate(), SAMPLE_RATE);
    assert_eq!(decoded.frame_count(), 2 * SAMPLE_RATE as usize);
    assert!(decoded.samples().iter().any(|s| s.abs() > 0.01));
    // the release faded out completely
    let tail = &decoded.samples()[decoded.samples().len() - 200..];
    assert!(tail.iter().all(|s| *s == 0.0));

    std::fs::remove_file(&path).unwrap();
}
