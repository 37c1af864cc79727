//! Integration tests for midi-sostenuto.
//!
//! These exercise full pedalling scenarios end to end through the public
//! surface, the way a host would drive the engine.

use std::sync::{Arc, Mutex};

use midi_sostenuto::{Error, EventKind, PedalEvent, PedalInput, SostenutoPedal};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Engine with all four sinks feeding one ordered log.
fn recording_pedal() -> (SostenutoPedal, Arc<Mutex<Vec<PedalEvent>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut pedal = SostenutoPedal::new();
    for kind in EventKind::ALL {
        let log = Arc::clone(&log);
        pedal.register_sink(kind, move |event| log.lock().unwrap().push(*event));
    }
    (pedal, log)
}

fn drain(log: &Arc<Mutex<Vec<PedalEvent>>>) -> Vec<PedalEvent> {
    std::mem::take(&mut *log.lock().unwrap())
}

fn note_on(channel: u8, note: u8, velocity: u8) -> PedalEvent {
    PedalEvent::NoteOn {
        channel,
        note,
        velocity,
    }
}

fn note_off(channel: u8, note: u8) -> PedalEvent {
    PedalEvent::NoteOff { channel, note }
}

// ---------------------------------------------------------------------------
// 1. Full pedalling scenario
// ---------------------------------------------------------------------------

/// Chord held through a pedal press, a passing note on top, then release:
/// the chord's note-offs arrive at release in ascending note order, the
/// passing note's immediately.
#[test]
fn test_chord_hold_with_passing_note() {
    init_tracing();
    let (mut pedal, log) = recording_pedal();

    pedal.note_on(0, 60, 100).unwrap();
    pedal.note_on(0, 64, 100).unwrap();
    pedal.press(0).unwrap();
    assert_eq!(
        drain(&log),
        vec![
            note_on(0, 60, 100),
            note_on(0, 64, 100),
            PedalEvent::SostenutoOn { channel: 0 },
        ]
    );

    // Keys come up while the pedal holds them: nothing is emitted.
    pedal.note_off(0, 60).unwrap();
    pedal.note_off(0, 64).unwrap();
    assert!(drain(&log).is_empty());

    // A note struck after the press is not captured.
    pedal.note_on(0, 67, 100).unwrap();
    pedal.note_off(0, 67).unwrap();
    assert_eq!(drain(&log), vec![note_on(0, 67, 100), note_off(0, 67)]);

    pedal.release(0).unwrap();
    assert_eq!(
        drain(&log),
        vec![
            note_off(0, 60),
            note_off(0, 64),
            PedalEvent::SostenutoOff { channel: 0 },
        ]
    );
}

/// Each deferred note-off is emitted exactly once: a second release finds
/// nothing left to flush.
#[test]
fn test_deferred_off_emitted_exactly_once() {
    let (mut pedal, log) = recording_pedal();
    pedal.note_on(0, 60, 100).unwrap();
    pedal.press(0).unwrap();
    pedal.note_off(0, 60).unwrap();
    drain(&log);

    pedal.release(0).unwrap();
    pedal.release(0).unwrap();
    let events = drain(&log);
    let offs = events
        .iter()
        .filter(|e| e.kind() == EventKind::NoteOff)
        .count();
    assert_eq!(offs, 1);
}

/// A key still held at release gets no note-off from the engine; its
/// eventual note-off passes through normally once the pedal is up.
#[test]
fn test_key_held_through_release() {
    let (mut pedal, log) = recording_pedal();
    pedal.note_on(0, 60, 100).unwrap();
    pedal.press(0).unwrap();
    drain(&log);

    pedal.release(0).unwrap();
    assert_eq!(drain(&log), vec![PedalEvent::SostenutoOff { channel: 0 }]);

    pedal.note_off(0, 60).unwrap();
    assert_eq!(drain(&log), vec![note_off(0, 60)]);
}

// ---------------------------------------------------------------------------
// 2. Multi-channel and multi-instance independence
// ---------------------------------------------------------------------------

#[test]
fn test_pedal_state_is_per_channel() {
    let (mut pedal, log) = recording_pedal();
    for channel in [0u8, 7, 15] {
        pedal.note_on(channel, 60, 100).unwrap();
    }
    pedal.press(7).unwrap();
    drain(&log);

    for channel in [0u8, 7, 15] {
        pedal.note_off(channel, 60).unwrap();
    }
    // Only channel 7 defers.
    assert_eq!(drain(&log), vec![note_off(0, 60), note_off(15, 60)]);

    pedal.release(7).unwrap();
    assert_eq!(
        drain(&log),
        vec![note_off(7, 60), PedalEvent::SostenutoOff { channel: 7 }]
    );
}

/// Two engines (e.g. two devices) share nothing.
#[test]
fn test_instances_are_independent() {
    let (mut a, log_a) = recording_pedal();
    let (mut b, log_b) = recording_pedal();

    a.note_on(0, 60, 100).unwrap();
    a.press(0).unwrap();
    b.note_on(0, 60, 100).unwrap();
    drain(&log_a);
    drain(&log_b);

    a.note_off(0, 60).unwrap();
    b.note_off(0, 60).unwrap();
    assert!(drain(&log_a).is_empty(), "engine A defers");
    assert_eq!(drain(&log_b), vec![note_off(0, 60)], "engine B passes through");
}

// ---------------------------------------------------------------------------
// 3. Decoded-input funnel
// ---------------------------------------------------------------------------

/// Driving the engine through `process` matches the direct operations.
#[test]
fn test_process_stream_matches_direct_calls() {
    let stream = [
        PedalInput::NoteOn {
            channel: 2,
            note: 48,
            velocity: 90,
        },
        PedalInput::Press { channel: 2 },
        PedalInput::NoteOff {
            channel: 2,
            note: 48,
        },
        PedalInput::NoteOn {
            channel: 2,
            note: 50,
            velocity: 90,
        },
        PedalInput::Release { channel: 2 },
    ];

    let (mut via_process, log_p) = recording_pedal();
    for input in stream {
        via_process.process(input).unwrap();
    }

    let (mut direct, log_d) = recording_pedal();
    direct.note_on(2, 48, 90).unwrap();
    direct.press(2).unwrap();
    direct.note_off(2, 48).unwrap();
    direct.note_on(2, 50, 90).unwrap();
    direct.release(2).unwrap();

    assert_eq!(drain(&log_p), drain(&log_d));
}

#[test]
fn test_process_validates_like_direct_calls() {
    let (mut pedal, log) = recording_pedal();
    assert_eq!(
        pedal.process(PedalInput::Press { channel: 16 }),
        Err(Error::ChannelOutOfRange(16))
    );
    assert_eq!(
        pedal.process(PedalInput::NoteOn {
            channel: 0,
            note: 128,
            velocity: 0,
        }),
        Err(Error::NoteOutOfRange(128))
    );
    assert!(drain(&log).is_empty());
}

// ---------------------------------------------------------------------------
// 4. Reset
// ---------------------------------------------------------------------------

#[test]
fn test_reset_all_flushes_every_channel() {
    let (mut pedal, log) = recording_pedal();
    for channel in [1u8, 9] {
        pedal.note_on(channel, 72, 100).unwrap();
        pedal.press(channel).unwrap();
        pedal.note_off(channel, 72).unwrap();
    }
    drain(&log);

    pedal.reset_all();
    assert_eq!(
        drain(&log),
        vec![
            note_off(1, 72),
            PedalEvent::SostenutoOff { channel: 1 },
            note_off(9, 72),
            PedalEvent::SostenutoOff { channel: 9 },
        ]
    );
    for channel in 0..16 {
        assert!(!pedal.is_pressed(channel).unwrap());
        assert!(pedal.sustaining_notes(channel).unwrap().is_empty());
    }
}

// ---------------------------------------------------------------------------
// 5. Event types on the wire
// ---------------------------------------------------------------------------

#[test]
fn test_event_kind_wire_names() {
    assert_eq!("note-off".parse::<EventKind>().unwrap(), EventKind::NoteOff);
    assert_eq!(
        "sostenuto-on".parse::<EventKind>().unwrap(),
        EventKind::SostenutoOn
    );
    assert_eq!(
        serde_json::to_string(&EventKind::SostenutoOff).unwrap(),
        "\"sostenuto-off\""
    );
}

#[test]
fn test_pedal_event_serde_roundtrip() {
    let events = [
        note_on(0, 60, 100),
        note_off(15, 127),
        PedalEvent::SostenutoOn { channel: 3 },
        PedalEvent::SostenutoOff { channel: 3 },
    ];
    for event in events {
        let json = serde_json::to_string(&event).unwrap();
        let back: PedalEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
