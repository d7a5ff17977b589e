//! Plays a sample as granular instrument on the default audio device.

use std::time::Duration;

use granular_synth::{
    outputs::CpalOutput, utils::pitch_from_note, AdsrParameters, Error, GrainPlayMode,
    GranularSynth, SampleInterpolation, SynthParameters,
};

// -------------------------------------------------------------------------------------------------

// Common demo code
#[path = "./common/arguments.rs"]
mod arguments;

// -------------------------------------------------------------------------------------------------

#[cfg(all(debug_assertions, feature = "assert-allocs"))]
#[global_allocator]
static A: assert_no_alloc::AllocDisabler = assert_no_alloc::AllocDisabler;

// -------------------------------------------------------------------------------------------------

// Synth parameter consts (tweak as needed!)

// ADSR Envelope parameters
const ATTACK_MS: u64 = 300;
const DECAY_MS: u64 = 200;
const SUSTAIN_LEVEL: f32 = 0.8;
const RELEASE_MS: u64 = 1500;

// Grain parameters
const GRAINS_PER_SECOND: u32 = 40; // 1hz - 100hz
const GRAIN_SMOOTHNESS: f32 = 1.0; // 0.0 = no fades, 1.0 = full fades
const GRAIN_SIZE_RANDOM: f64 = 0.05; // max size offset in seconds
const GRAIN_POSITION_RANDOM: f32 = 0.5; // relative to the grain size
const GRAIN_PLAY_MODE: GrainPlayMode = GrainPlayMode::Forward;

// Play window in seconds
const WINDOW_START: f64 = 1.0;
const WINDOW_END: f64 = 1.15;

// Notes to play: MIDI note, start and length in ms
const NOTES: [(u8, u64, u64); 6] = [
    (60, 0, 3000),
    (67, 500, 2500),
    (72, 1000, 2000),
    (55, 3500, 2500),
    (62, 4000, 2000),
    (79, 4500, 1500),
];

// -------------------------------------------------------------------------------------------------

fn main() -> Result<(), Error> {
    // Parse optional arguments
    let args = arguments::parse();

    // Open the default output device
    let mut output = CpalOutput::open()?;

    let parameters = SynthParameters::default()
        .grains_per_second(GRAINS_PER_SECOND)
        .grain_smoothness(GRAIN_SMOOTHNESS)
        .size_random(GRAIN_SIZE_RANDOM)
        .position_offset_random(GRAIN_POSITION_RANDOM)
        .play_mode(GRAIN_PLAY_MODE)
        .interpolation(SampleInterpolation::Cubic)
        .envelope(AdsrParameters::new(
            Duration::from_millis(ATTACK_MS),
            Duration::from_millis(DECAY_MS),
            SUSTAIN_LEVEL,
            Duration::from_millis(RELEASE_MS),
        )?);

    println!("Synth parameters:");
    println!("  Grains/s: {}", parameters.grains_per_second);
    println!("  Smoothness: {}", parameters.grain_smoothness);
    println!("  Size random: {} s", parameters.size_random);
    println!("  Position random: {}", parameters.position_offset_random);
    println!("  Play mode: {}", parameters.play_mode);
    println!("  Window: {WINDOW_START}..{WINDOW_END} s");

    // Create the synth and move it into the audio thread
    let sample = arguments::load_sample(&args)?;
    let mut synth = GranularSynth::new(Some(sample), output.sample_rate(), parameters)?;
    synth.set_window(WINDOW_START, WINDOW_END);
    let handle = synth.handle();
    output.play(synth)?;

    // Schedule note ons and offs
    let mut events = Vec::new();
    for (id, (note, start, length)) in NOTES.iter().enumerate() {
        events.push((*start, id as u32, Some(*note)));
        events.push((start + length, id as u32, None));
    }
    events.sort_by_key(|(time, _, _)| *time);

    let mut current_time = 0;
    for (time, id, note) in events {
        std::thread::sleep(Duration::from_millis(time - current_time));
        current_time = time;
        match note {
            Some(note) => {
                println!("Note on: {note}");
                handle.note_on(id, pitch_from_note(note), 0.8)?;
            }
            None => handle.note_off(id)?,
        }
    }

    // Wait until the release tails faded out
    std::thread::sleep(Duration::from_millis(RELEASE_MS + 500));
    output.close();

    Ok(())
}
