//! Per-channel pedal state.

use crate::note_set::NoteSet;

/// State for one MIDI channel.
///
/// `sustaining` is always a subset of `captured`: a note only enters it via
/// a note-off while the pedal holds it captured, and both tables are cleared
/// together at pedal release.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ChannelState {
    /// Physical key position per note, tracked independently of the pedal.
    pub(crate) key_down: NoteSet,
    /// Snapshot of `key_down` taken at the most recent pedal press.
    pub(crate) captured: NoteSet,
    /// Captured notes whose key was released while the pedal was down;
    /// their note-offs are pending until release.
    pub(crate) sustaining: NoteSet,
    /// Pedal position.
    pub(crate) pressed: bool,
}
