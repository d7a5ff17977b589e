use std::sync::Arc;

use crossbeam_queue::ArrayQueue;
use four_cc::FourCC;

use crate::{error::Error, parameter::ParameterValueUpdate};

// -------------------------------------------------------------------------------------------------

/// Capacity of a synth's control message queue.
pub(crate) const MESSAGE_QUEUE_SIZE: usize = 1024;

// -------------------------------------------------------------------------------------------------

/// Control messages for a [`GranularSynth`](super::GranularSynth), sent via a [`SynthHandle`]
/// and applied in the audio thread at the start of the next rendered block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SynthMessage {
    /// Trigger a new note with the given linear pitch ratio.
    NoteOn { id: u32, pitch: f32, velocity: f32 },
    /// Release all voices which play the given note id.
    NoteOff { id: u32 },
    /// Release all playing voices.
    AllNotesOff,
    /// Set the sample play window in seconds.
    SetWindow { start: f64, end: f64 },
    /// Set a synth parameter value, see [`SynthParameters`](super::SynthParameters).
    SetParameter {
        id: FourCC,
        value: ParameterValueUpdate,
    },
}

// -------------------------------------------------------------------------------------------------

/// Control a [`GranularSynth`](super::GranularSynth) from other threads than the audio thread.
///
/// Handles are `Send` and `Sync` and can be cloned, so they can be used from e.g. a UI and
/// a MIDI thread at the same time. Messages never block: when the synth's message queue is
/// full, sending fails with an [`Error::SendError`].
#[derive(Debug, Clone)]
pub struct SynthHandle {
    message_queue: Arc<ArrayQueue<SynthMessage>>,
}

impl SynthHandle {
    pub(crate) fn new(message_queue: Arc<ArrayQueue<SynthMessage>>) -> Self {
        Self { message_queue }
    }

    /// Trigger a new note. Notes are silently dropped in the synth when all voices are busy.
    pub fn note_on(&self, id: u32, pitch: f32, velocity: f32) -> Result<(), Error> {
        self.send(SynthMessage::NoteOn {
            id,
            pitch,
            velocity,
        })
    }

    /// Release the note with the given id.
    pub fn note_off(&self, id: u32) -> Result<(), Error> {
        // Force push note offs to avoid hanging notes...
        self.force_send(SynthMessage::NoteOff { id });
        Ok(())
    }

    /// Release all playing notes.
    pub fn all_notes_off(&self) -> Result<(), Error> {
        self.force_send(SynthMessage::AllNotesOff);
        Ok(())
    }

    /// Set the sample play window in seconds.
    pub fn set_window(&self, start: f64, end: f64) -> Result<(), Error> {
        self.send(SynthMessage::SetWindow { start, end })
    }

    /// Set a synth parameter value.
    pub fn set_parameter(&self, id: FourCC, value: ParameterValueUpdate) -> Result<(), Error> {
        self.send(SynthMessage::SetParameter { id, value })
    }

    /// Send a raw message to the synth.
    pub fn send(&self, message: SynthMessage) -> Result<(), Error> {
        self.message_queue.push(message).map_err(|message| {
            log::warn!("Synth message queue is full: dropping message {message:?}");
            Error::SendError(format!("message queue is full ({message:?})"))
        })
    }

    fn force_send(&self, message: SynthMessage) {
        if let Some(dropped) = self.message_queue.force_push(message) {
            log::warn!("Synth message queue is full: dropped oldest message {dropped:?}");
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_queue() {
        let queue = Arc::new(ArrayQueue::new(2));
        let handle = SynthHandle::new(Arc::clone(&queue));
        assert!(handle.note_on(1, 1.0, 1.0).is_ok());
        assert!(handle.set_window(0.0, 1.0).is_ok());
        assert!(matches!(
            handle.note_on(2, 1.0, 1.0),
            Err(Error::SendError(_))
        ));

        // note offs replace the oldest message
        assert!(handle.note_off(1).is_ok());
        assert_eq!(
            queue.pop(),
            Some(SynthMessage::SetWindow {
                start: 0.0,
                end: 1.0
            })
        );
        assert_eq!(queue.pop(), Some(SynthMessage::NoteOff { id: 1 }));
        assert_eq!(queue.pop(), None);
    }
}
