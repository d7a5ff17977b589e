use std::{fs::File, io, path::Path};

use symphonia::core::{
    audio::{SampleBuffer, SignalSpec},
    codecs::{Decoder, DecoderOptions},
    errors::Error as SymphoniaError,
    formats::{FormatOptions, FormatReader},
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};

use crate::error::Error;

// -------------------------------------------------------------------------------------------------

/// Decodes a single audio track of some audio file into interleaved `f32` samples.
pub(crate) struct AudioDecoder {
    track_id: u32, // Internal track index.
    decoder: Box<dyn Decoder>,
    format: Box<dyn FormatReader>,
}

impl AudioDecoder {
    /// Create a new decoder from the given file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = match File::open(path.as_ref()) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(Error::MediaFileNotFound);
            }
            Err(err) => return Err(err.into()),
        };

        let mut hint = Hint::new();
        if let Some(extension) = path.as_ref().extension().and_then(|e| e.to_str()) {
            hint.with_extension(extension);
        }
        let source_stream = MediaSourceStream::new(Box::new(file), Default::default());
        Self::from_source_stream(source_stream, hint)
    }

    /// Create a new decoder from the given Symphonia MediaSourceStream.
    pub fn from_source_stream(source_stream: MediaSourceStream, hint: Hint) -> Result<Self, Error> {
        // Use the default options when reading and decoding.
        let format_opts: FormatOptions = Default::default();
        let metadata_opts: MetadataOptions = Default::default();
        let decoder_opts: DecoderOptions = Default::default();

        // Probe the media source stream for a format.
        let probed = symphonia::default::get_probe()
            .format(&hint, source_stream, &format_opts, &metadata_opts)
            .map_err(|_| Error::MediaFileProbeError)?;

        // Get the format reader yielded by the probe operation.
        let format = probed.format;

        // Get the default track.
        let track = format.default_track().ok_or(Error::MediaFileNotFound)?;
        let track_id = track.id;

        // Create a decoder for the track.
        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &decoder_opts)
            .map_err(|err| Error::AudioDecodingError(Box::new(err)))?;

        Ok(Self {
            track_id,
            decoder,
            format,
        })
    }

    /// The decoded track's sample rate and channel layout.
    pub fn signal_spec(&self) -> Result<SignalSpec, Error> {
        let params = self.decoder.codec_params();
        match (params.sample_rate, params.channels) {
            (Some(rate), Some(channels)) => Ok(SignalSpec { rate, channels }),
            _ => Err(Error::MediaFileProbeError),
        }
    }

    /// Decode all remaining packets into a single interleaved buffer.
    pub fn decode_all(&mut self) -> Result<Vec<f32>, Error> {
        let spec = self.signal_spec()?;
        let channel_count = spec.channels.count();

        // prealloc entire buffer, when the decoder gives us a frame hint
        let params = self.decoder.codec_params();
        let buffer_capacity = params.n_frames.unwrap_or(0) as usize * channel_count;
        let decode_buffer_capacity = params
            .max_frames_per_packet
            .unwrap_or(16 * 1024 * channel_count as u64);

        let mut buffer = Vec::with_capacity(buffer_capacity);
        let mut decode_buffer = SampleBuffer::<f32>::new(decode_buffer_capacity, spec);
        while self.read_packet(&mut decode_buffer) {
            buffer.extend_from_slice(decode_buffer.samples());
        }
        if buffer.is_empty() {
            return Err(Error::AudioDecodingError(Box::new(
                SymphoniaError::DecodeError("file contains no decodable audio"),
            )));
        }
        Ok(buffer)
    }

    /// Read a next packet of audio from this decoder. Returns `false` in case
    /// of EOF or internal error.
    fn read_packet(&mut self, samples: &mut SampleBuffer<f32>) -> bool {
        loop {
            // Demux an encoded packet from the media format.
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(io)) if io.kind() == io::ErrorKind::UnexpectedEof => {
                    return false; // End of this stream.
                }
                Err(err) => {
                    log::error!("format error: {err}");
                    return false; // We cannot recover from format errors, quit.
                }
            };
            // If the packet does not belong to the selected track, skip over it.
            if packet.track_id() != self.track_id {
                continue;
            }
            // Decode the packet into an audio buffer.
            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    // Interleave the samples into the buffer.
                    samples.copy_interleaved_ref(decoded);
                    return true;
                }
                Err(SymphoniaError::IoError(err)) => {
                    // The packet failed to decode due to an IO error, skip the packet.
                    log::error!("io decode error: {err}");
                    continue;
                }
                Err(SymphoniaError::DecodeError(err)) => {
                    // The packet failed to decode due to invalid data, skip the packet.
                    log::error!("decode error: {err}");
                    continue;
                }
                Err(err) => {
                    log::error!("fatal decode error: {err}");
                    return false;
                }
            };
        }
    }
}
