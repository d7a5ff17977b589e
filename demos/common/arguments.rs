use std::{f32::consts::TAU, path::PathBuf};

use arg::{parse_args, Args};

use granular_synth::{Error, SampleBuffer};

// -------------------------------------------------------------------------------------------------

const DEFAULT_LOG_LEVEL: log::Level = if cfg!(debug_assertions) {
    log::Level::Debug
} else {
    log::Level::Warn
};

// -------------------------------------------------------------------------------------------------

/// Default program arguments for the granular synth demo applications.
#[derive(Args, Debug, Default)]
#[allow(unused)]
pub struct Arguments {
    #[arg(short = "s", long = "sample")]
    /// Audio file which gets played by the synth. When missing, a synthetic chord is used.
    pub sample_path: Option<PathBuf>,
    #[arg(short = "o", long = "output")]
    /// Path of the rendered wav file. Only used by the offline render demo.
    pub output_path: Option<PathBuf>,
    #[arg(short = "l", long = "log-level")]
    /// Set logging level to \"debug\", \"info\", \"warn\" or \"error\".
    /// By default \"debug\" in dev builds and \"warn\" in release builds.
    pub log_level: Option<log::Level>,
}

/// Parse common demo arguments and apply the log-level arg to the logger
#[allow(unused)]
pub fn parse() -> Arguments {
    // Parse args
    let args = parse_args::<Arguments>();

    create_logger(args.log_level);
    args
}

// -------------------------------------------------------------------------------------------------

/// Create default logger from arguments. Invoked from `parse`.
#[allow(unused)]
pub fn create_logger(log_level: Option<log::Level>) {
    // Init logger
    simple_logger::SimpleLogger::new()
        // use default or arg level by default
        .with_level(log_level.unwrap_or(DEFAULT_LOG_LEVEL).to_level_filter())
        // disable logging in chatty modules
        .with_module_level("symphonia_core", log::LevelFilter::Warn)
        .with_module_level("symphonia_format", log::LevelFilter::Warn)
        .init()
        .expect("Failed to set logger");
}

// -------------------------------------------------------------------------------------------------

/// Load the sample from the sample path argument, or create a synthetic one.
#[allow(unused)]
pub fn load_sample(args: &Arguments) -> Result<SampleBuffer, Error> {
    if let Some(sample_path) = &args.sample_path {
        SampleBuffer::from_file(sample_path)
    } else {
        synthetic_sample()
    }
}

/// A 4 second stereo A minor chord with a slowly moving brightness, so grains taken from
/// different positions sound different.
fn synthetic_sample() -> Result<SampleBuffer, Error> {
    const SAMPLE_RATE: u32 = 44100;
    const DURATION: f32 = 4.0;
    const FREQUENCIES: [f32; 3] = [220.0, 261.63, 329.63];

    let frame_count = (DURATION * SAMPLE_RATE as f32) as usize;
    let mut samples = Vec::with_capacity(frame_count * 2);
    for frame in 0..frame_count {
        let time = frame as f32 / SAMPLE_RATE as f32;
        let brightness = 0.5 - 0.5 * (TAU * time / DURATION).cos();
        let mut left = 0.0;
        let mut right = 0.0;
        for (index, frequency) in FREQUENCIES.iter().enumerate() {
            let phase = TAU * frequency * time;
            let value = phase.sin() + brightness * 0.3 * (3.0 * phase).sin();
            // spread the chord's notes in the stereo field
            let pan = index as f32 / (FREQUENCIES.len() - 1) as f32;
            left += value * (1.0 - pan * 0.5);
            right += value * (0.5 + pan * 0.5);
        }
        samples.push(left * 0.2);
        samples.push(right * 0.2);
    }
    SampleBuffer::from_interleaved(samples, 2, SAMPLE_RATE)
}
