use std::{error, fmt, io};

// -------------------------------------------------------------------------------------------------

/// Provides an enumeration of all possible errors reported by the granular synth.
///
/// Note that errors are only reported outside of the audio render path: when loading samples,
/// validating parameters, sending control messages or opening output devices. Rendering itself
/// never fails.
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    MediaFileNotFound,
    MediaFileProbeError,
    AudioDecodingError(Box<dyn error::Error + Send + Sync>),
    OutputDeviceError(Box<dyn error::Error + Send + Sync>),
    ParameterError(String),
    SendError(String),
    IoError(io::Error),
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MediaFileNotFound => write!(f, "Audio file not found"),
            Self::MediaFileProbeError => write!(f, "Audio file failed to probe"),
            Self::AudioDecodingError(err) | Self::OutputDeviceError(err) => err.fmt(f),
            Self::ParameterError(str) => write!(f, "Invalid parameter: {str}"),
            Self::SendError(str) => write!(f, "Failed to send synth message: {str}"),
            Self::IoError(err) => err.fmt(f),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            Error::ParameterError("grains per second".to_string()).to_string(),
            "Invalid parameter: grains per second"
        );
        assert_eq!(
            Error::SendError("queue is full".to_string()).to_string(),
            "Failed to send synth message: queue is full"
        );
        let io_error = Error::from(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert!(matches!(io_error, Error::IoError(_)));
        assert_eq!(io_error.to_string(), "missing");
    }
}
