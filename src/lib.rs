//! Sostenuto pedal processor for MIDI note streams.
//!
//! Models the middle piano pedal as a pure state machine over the 16 MIDI
//! channels: notes sounding at the instant the pedal is pressed are held
//! until release, even if their keys come up earlier; notes struck after
//! the press pass through untouched. The crate does no protocol decoding
//! and no I/O — a host decodes raw messages into the four input operations
//! and routes the emitted events to its synthesis engine.
//!
//! # Example
//!
//! ```
//! use midi_sostenuto::{EventKind, PedalEvent, SostenutoPedal};
//!
//! let mut pedal = SostenutoPedal::new();
//! pedal.register_sink(EventKind::NoteOff, |event| {
//!     if let PedalEvent::NoteOff { channel, note } = event {
//!         println!("note-off ch={channel} note={note}");
//!     }
//! });
//!
//! pedal.note_on(0, 60, 100)?;
//! pedal.press(0)?;
//! pedal.note_off(0, 60)?; // withheld: the pedal holds the note
//! pedal.release(0)?;      // the note-off for 60 arrives here
//! # Ok::<(), midi_sostenuto::Error>(())
//! ```

pub mod error;
pub use error::{Error, Result};

pub(crate) mod channel;

mod event;
mod note_set;
mod pedal;

pub use event::{EventKind, PedalEvent, PedalInput};
pub use note_set::NoteSet;
pub use pedal::{Sink, SostenutoPedal, NUM_CHANNELS, NUM_NOTES};
