//! The sostenuto pedal engine.
//!
//! [`SostenutoPedal`] owns the state of all 16 MIDI channels and turns the
//! four input operations (note-on, note-off, pedal press, pedal release)
//! into re-timed output events. Unlike a sustain (damper) pedal, only notes
//! already sounding at the instant of the press are held; notes struck
//! afterwards pass through untouched.

use std::fmt;

use tracing::{debug, trace};

use crate::channel::ChannelState;
use crate::error::{Error, Result};
use crate::event::{EventKind, PedalEvent, PedalInput};
use crate::note_set::NoteSet;

/// Number of MIDI channels.
pub const NUM_CHANNELS: usize = 16;
/// Number of MIDI notes.
pub const NUM_NOTES: usize = 128;

/// Sink bound to one event kind, invoked synchronously from the engine.
///
/// The sink runs on the caller's stack before the originating operation
/// returns. The engine guarantees a sink only ever receives events of the
/// kind it was registered for.
pub type Sink = Box<dyn FnMut(&PedalEvent) + Send>;

/// Per-channel sostenuto pedal processor.
///
/// Each instance is fully independent; hosts driving several devices create
/// one engine per device. The engine is single-threaded by design: callers
/// needing cross-thread access wrap it in their own lock.
pub struct SostenutoPedal {
    channels: [ChannelState; NUM_CHANNELS],
    sinks: [Option<Sink>; 4],
}

impl SostenutoPedal {
    pub fn new() -> Self {
        Self {
            channels: [ChannelState::default(); NUM_CHANNELS],
            sinks: [None, None, None, None],
        }
    }

    // ==================== Sink registry ====================

    /// Bind `sink` to `kind`, replacing any prior binding.
    pub fn register_sink(&mut self, kind: EventKind, sink: impl FnMut(&PedalEvent) + Send + 'static) {
        self.sinks[kind.slot()] = Some(Box::new(sink));
    }

    /// Bind a sink by its wire name (`"note-off"`, `"note-on"`,
    /// `"sostenuto-on"`, `"sostenuto-off"`).
    ///
    /// Fails with [`Error::UnknownEvent`] for any other name, leaving the
    /// registry untouched.
    pub fn register_sink_by_name(
        &mut self,
        name: &str,
        sink: impl FnMut(&PedalEvent) + Send + 'static,
    ) -> Result<()> {
        let kind: EventKind = name.parse()?;
        self.register_sink(kind, sink);
        Ok(())
    }

    /// Remove the binding for `kind`. Returns whether one was bound.
    pub fn unregister_sink(&mut self, kind: EventKind) -> bool {
        self.sinks[kind.slot()].take().is_some()
    }

    /// Deliver `event` to the sink bound to its kind.
    ///
    /// Returns `false` when no sink is bound. Delivery is a direct call,
    /// not a queue: re-entrant calls from inside a sink follow normal
    /// call-stack ordering.
    pub fn emit(&mut self, event: &PedalEvent) -> bool {
        match &mut self.sinks[event.kind().slot()] {
            Some(sink) => {
                sink(event);
                true
            }
            None => false,
        }
    }

    // ==================== Transitions ====================

    /// Press the pedal on `channel`.
    ///
    /// Snapshots the currently held keys as the captured set and emits
    /// `sostenuto-on`. Pressing again while already down re-snapshots.
    pub fn press(&mut self, channel: u8) -> Result<()> {
        let ch = Self::check_channel(channel)?;
        let state = &mut self.channels[ch];
        state.pressed = true;
        state.captured = state.key_down;
        debug!(channel, captured = state.captured.len(), "sostenuto pedal pressed");
        self.emit(&PedalEvent::SostenutoOn { channel });
        Ok(())
    }

    /// Release the pedal on `channel`.
    ///
    /// Emits the deferred note-off for every sustaining note in ascending
    /// note order, then `sostenuto-off`. Releasing an already-released
    /// pedal emits `sostenuto-off` again and nothing else.
    pub fn release(&mut self, channel: u8) -> Result<()> {
        let ch = Self::check_channel(channel)?;
        let state = &mut self.channels[ch];
        state.pressed = false;
        let deferred = state.sustaining;
        state.captured.clear();
        state.sustaining.clear();
        debug!(channel, deferred = deferred.len(), "sostenuto pedal released");
        for note in deferred {
            trace!(channel, note, "flushing deferred note-off");
            self.emit(&PedalEvent::NoteOff { channel, note });
        }
        self.emit(&PedalEvent::SostenutoOff { channel });
        Ok(())
    }

    /// Process a note-on.
    ///
    /// Marks the key as held and passes the note-on through; note-ons are
    /// never suppressed or deferred. Re-striking a note the pedal is
    /// currently sustaining first flushes its pending note-off, so
    /// downstream never sees two stacked note-ons for one key; the note
    /// stays captured and re-defers on its next note-off.
    pub fn note_on(&mut self, channel: u8, note: u8, velocity: u8) -> Result<()> {
        let ch = Self::check_channel(channel)?;
        Self::check_note(note)?;
        Self::check_velocity(velocity)?;
        let flush_pending = {
            let state = &mut self.channels[ch];
            state.key_down.insert(note);
            if state.pressed && state.sustaining.contains(note) {
                state.sustaining.remove(note);
                true
            } else {
                false
            }
        };
        if flush_pending {
            trace!(channel, note, "re-strike of sustaining note, flushing deferred note-off");
            self.emit(&PedalEvent::NoteOff { channel, note });
        }
        self.emit(&PedalEvent::NoteOn { channel, note, velocity });
        Ok(())
    }

    /// Process a note-off.
    ///
    /// Marks the key as released. If the pedal is down and the note was
    /// captured at press time, the note-off is withheld until [`release`];
    /// otherwise it passes through immediately.
    ///
    /// [`release`]: SostenutoPedal::release
    pub fn note_off(&mut self, channel: u8, note: u8) -> Result<()> {
        let ch = Self::check_channel(channel)?;
        Self::check_note(note)?;
        let deferred = {
            let state = &mut self.channels[ch];
            state.key_down.remove(note);
            if state.pressed && state.captured.contains(note) {
                state.sustaining.insert(note);
                true
            } else {
                false
            }
        };
        if deferred {
            trace!(channel, note, "note-off deferred until pedal release");
        } else {
            self.emit(&PedalEvent::NoteOff { channel, note });
        }
        Ok(())
    }

    /// Route a decoded input operation to the matching transition.
    pub fn process(&mut self, input: PedalInput) -> Result<()> {
        match input {
            PedalInput::NoteOn {
                channel,
                note,
                velocity,
            } => self.note_on(channel, note, velocity),
            PedalInput::NoteOff { channel, note } => self.note_off(channel, note),
            PedalInput::Press { channel } => self.press(channel),
            PedalInput::Release { channel } => self.release(channel),
        }
    }

    // ==================== Reset ====================

    /// Reset one channel: release the pedal, flush a note-off for every
    /// note the engine was artificially sustaining, and clear all key
    /// state. Emits `sostenuto-off` if the pedal was down.
    pub fn reset(&mut self, channel: u8) -> Result<()> {
        let ch = Self::check_channel(channel)?;
        self.reset_channel(ch);
        Ok(())
    }

    /// [`reset`](SostenutoPedal::reset) applied to all 16 channels.
    pub fn reset_all(&mut self) {
        for ch in 0..NUM_CHANNELS {
            self.reset_channel(ch);
        }
    }

    fn reset_channel(&mut self, ch: usize) {
        let channel = ch as u8;
        let state = &mut self.channels[ch];
        let was_pressed = state.pressed;
        let deferred = state.sustaining;
        *state = ChannelState::default();
        if was_pressed || !deferred.is_empty() {
            debug!(channel, flushed = deferred.len(), "pedal channel reset");
        }
        for note in deferred {
            self.emit(&PedalEvent::NoteOff { channel, note });
        }
        if was_pressed {
            self.emit(&PedalEvent::SostenutoOff { channel });
        }
    }

    // ==================== Accessors ====================

    /// Current pedal position for `channel`.
    pub fn is_pressed(&self, channel: u8) -> Result<bool> {
        let ch = Self::check_channel(channel)?;
        Ok(self.channels[ch].pressed)
    }

    /// Whether the key for `note` is physically held, independent of the
    /// pedal.
    pub fn is_key_down(&self, channel: u8, note: u8) -> Result<bool> {
        let ch = Self::check_channel(channel)?;
        Self::check_note(note)?;
        Ok(self.channels[ch].key_down.contains(note))
    }

    /// Whether `note` has a note-off pending until pedal release.
    pub fn is_sustaining(&self, channel: u8, note: u8) -> Result<bool> {
        let ch = Self::check_channel(channel)?;
        Self::check_note(note)?;
        Ok(self.channels[ch].sustaining.contains(note))
    }

    /// Notes currently held by the pedal alone (key released, note-off
    /// pending).
    pub fn sustaining_notes(&self, channel: u8) -> Result<NoteSet> {
        let ch = Self::check_channel(channel)?;
        Ok(self.channels[ch].sustaining)
    }

    // ==================== Validation ====================
    // Validation happens before any mutation; a failed operation leaves
    // the engine untouched.

    fn check_channel(channel: u8) -> Result<usize> {
        if channel as usize >= NUM_CHANNELS {
            return Err(Error::ChannelOutOfRange(channel));
        }
        Ok(channel as usize)
    }

    fn check_note(note: u8) -> Result<()> {
        if note as usize >= NUM_NOTES {
            return Err(Error::NoteOutOfRange(note));
        }
        Ok(())
    }

    fn check_velocity(velocity: u8) -> Result<()> {
        if velocity > 127 {
            return Err(Error::VelocityOutOfRange(velocity));
        }
        Ok(())
    }
}

impl Default for SostenutoPedal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SostenutoPedal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound: Vec<EventKind> = EventKind::ALL
            .into_iter()
            .filter(|kind| self.sinks[kind.slot()].is_some())
            .collect();
        f.debug_struct("SostenutoPedal")
            .field("channels", &self.channels)
            .field("sinks", &bound)
            .finish()
    }
}
