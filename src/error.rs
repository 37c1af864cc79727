//! Error types for the sostenuto pedal processor.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("channel {0} out of range (0-15)")]
    ChannelOutOfRange(u8),

    #[error("note {0} out of range (0-127)")]
    NoteOutOfRange(u8),

    #[error("velocity {0} out of range (0-127)")]
    VelocityOutOfRange(u8),

    #[error("unknown pedal event name: {0}")]
    UnknownEvent(String),
}

pub type Result<T> = std::result::Result<T, Error>;
