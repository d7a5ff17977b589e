//! Conversion helpers for event sources.

// -------------------------------------------------------------------------------------------------

/// Convert a MIDI note number to a linear pitch ratio, relative to middle C (note 60).
///
/// Useful for event sources which key notes by MIDI note numbers: the synth's note ons
/// expect linear pitch ratios, not semitones.
pub fn pitch_from_note(note: u8) -> f32 {
    2.0f32.powf((note as f32 - 60.0) / 12.0)
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_pitch_conversion() {
        assert_eq!(pitch_from_note(60), 1.0);
        assert!((pitch_from_note(72) - 2.0).abs() < 1e-6);
        assert!((pitch_from_note(48) - 0.5).abs() < 1e-6);
        assert!((pitch_from_note(67) - 1.498_307).abs() < 1e-5);
    }
}
