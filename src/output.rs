//! Optional render hosts for the synth: real-time playback via cpal and offline wav rendering.

#[cfg(feature = "cpal-output")]
pub mod cpal;
#[cfg(feature = "wav-output")]
pub mod wav;

/// Available audio hosts for cpal output (platform specific)
#[cfg(feature = "cpal-output")]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AudioHostId {
    #[default]
    Default, // system default
    #[cfg(target_os = "windows")]
    Wasapi,
    #[cfg(target_os = "linux")]
    Alsa,
}
