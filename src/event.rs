//! Pedal event and input types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Identifies one of the four pedal event streams.
///
/// Each kind has a wire name (`"note-off"`, `"note-on"`, `"sostenuto-on"`,
/// `"sostenuto-off"`) available through [`FromStr`] and [`fmt::Display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    NoteOff,
    NoteOn,
    SostenutoOn,
    SostenutoOff,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::NoteOff,
        EventKind::NoteOn,
        EventKind::SostenutoOn,
        EventKind::SostenutoOff,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::NoteOff => "note-off",
            EventKind::NoteOn => "note-on",
            EventKind::SostenutoOn => "sostenuto-on",
            EventKind::SostenutoOff => "sostenuto-off",
        }
    }

    /// Index into the engine's sink table.
    #[inline]
    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "note-off" => Ok(EventKind::NoteOff),
            "note-on" => Ok(EventKind::NoteOn),
            "sostenuto-on" => Ok(EventKind::SostenutoOn),
            "sostenuto-off" => Ok(EventKind::SostenutoOff),
            other => Err(Error::UnknownEvent(other.to_string())),
        }
    }
}

/// A notification produced by the engine and delivered to a bound sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PedalEvent {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    SostenutoOn { channel: u8 },
    SostenutoOff { channel: u8 },
}

impl PedalEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PedalEvent::NoteOn { .. } => EventKind::NoteOn,
            PedalEvent::NoteOff { .. } => EventKind::NoteOff,
            PedalEvent::SostenutoOn { .. } => EventKind::SostenutoOn,
            PedalEvent::SostenutoOff { .. } => EventKind::SostenutoOff,
        }
    }

    #[inline]
    pub fn channel(&self) -> u8 {
        match *self {
            PedalEvent::NoteOn { channel, .. }
            | PedalEvent::NoteOff { channel, .. }
            | PedalEvent::SostenutoOn { channel }
            | PedalEvent::SostenutoOff { channel } => channel,
        }
    }

    #[inline]
    pub fn note(&self) -> Option<u8> {
        match *self {
            PedalEvent::NoteOn { note, .. } | PedalEvent::NoteOff { note, .. } => Some(note),
            _ => None,
        }
    }
}

/// A decoded input operation for [`crate::SostenutoPedal::process`].
///
/// A host decodes raw protocol messages (hardware, file, network) into these
/// four operations and feeds them to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PedalInput {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    Press { channel: u8 },
    Release { channel: u8 },
}
