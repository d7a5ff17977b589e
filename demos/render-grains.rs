//! Renders a short granular phrase into a wav file, with parameter changes on the fly.

use std::{path::PathBuf, time::Duration};

use granular_synth::{
    outputs::WavOutput,
    parameters::{Parameter, ParameterValueUpdate},
    utils::pitch_from_note,
    Error, GrainPlayMode, GranularSynth, SynthParameters,
};

// -------------------------------------------------------------------------------------------------

// Common demo code
#[path = "./common/arguments.rs"]
mod arguments;

// -------------------------------------------------------------------------------------------------

const SAMPLE_RATE: u32 = 44100;
const CHANNEL_COUNT: usize = 2;
const DEFAULT_OUTPUT_PATH: &str = "render-grains.wav";

// -------------------------------------------------------------------------------------------------

fn main() -> Result<(), Error> {
    // Parse optional arguments
    let args = arguments::parse();

    let output_path = args
        .output_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));
    let mut output = WavOutput::open(&output_path, SAMPLE_RATE, CHANNEL_COUNT)?;

    // Seeded synth, so renderings are reproducible
    let sample = arguments::load_sample(&args)?;
    let mut synth = GranularSynth::new(
        Some(sample),
        SAMPLE_RATE,
        SynthParameters::default()
            .grains_per_second(25)
            .position_offset_random(0.3)
            .seed(0x5EED),
    )?;
    let handle = synth.handle();

    println!("Rendering into '{}'...", output_path.display());

    // A chord, played forwards
    handle.set_window(0.5, 0.6)?;
    for (id, note) in [57u8, 60, 64].into_iter().enumerate() {
        handle.note_on(id as u32, pitch_from_note(note), 0.7)?;
    }
    output.render(&mut synth, Duration::from_secs(2))?;
    handle.all_notes_off()?;
    output.render(&mut synth, Duration::from_millis(1500))?;

    // Same chord in ping-pong mode with a denser, rougher grain cloud
    handle.set_parameter(
        SynthParameters::PLAY_MODE.id(),
        ParameterValueUpdate::Plain(GrainPlayMode::PingPong as u8 as f32),
    )?;
    handle.set_parameter(
        SynthParameters::GRAINS_PER_SECOND.id(),
        ParameterValueUpdate::Normalized(0.6),
    )?;
    handle.set_parameter(
        SynthParameters::GRAIN_SMOOTHNESS.id(),
        ParameterValueUpdate::Plain(0.3),
    )?;
    handle.set_window(2.0, 2.25)?;
    for (id, note) in [57u8, 60, 64].into_iter().enumerate() {
        handle.note_on(id as u32 + 3, pitch_from_note(note), 0.7)?;
    }
    output.render(&mut synth, Duration::from_secs(2))?;
    handle.all_notes_off()?;
    output.render(&mut synth, Duration::from_millis(1500))?;

    output.finalize()?;
    println!("Rendered {} frames", output.frames_written());

    Ok(())
}
