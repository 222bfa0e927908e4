//! Note output
//!
//! Impacts produce percussive MIDI notes: a note-on immediately followed by
//! its note-off. Sinks are fire-and-forget; nothing is acknowledged.

use serde::Serialize;

/// Status byte for note-on, channel 1
pub const NOTE_ON: u8 = 0x90;
/// Status byte for note-off, channel 1
pub const NOTE_OFF: u8 = 0x80;

/// A channel voice message sent to the synth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MidiMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
}

impl MidiMessage {
    /// Raw 3-byte wire form
    pub fn to_bytes(self) -> [u8; 3] {
        match self {
            MidiMessage::NoteOn { note, velocity } => [NOTE_ON, note & 0x7F, velocity & 0x7F],
            MidiMessage::NoteOff { note } => [NOTE_OFF, note & 0x7F, 0],
        }
    }

    pub fn note(self) -> u8 {
        match self {
            MidiMessage::NoteOn { note, .. } | MidiMessage::NoteOff { note } => note,
        }
    }
}

/// Destination for note events
///
/// The simulation checks `is_connected` before emitting. A disconnected sink
/// only suppresses sound; collisions still resolve.
pub trait NoteSink {
    fn is_connected(&self) -> bool;

    fn send(&mut self, msg: MidiMessage);

    /// Percussive hit: note-on then note-off
    fn emit_note(&mut self, note: u8, velocity: u8) {
        self.send(MidiMessage::NoteOn { note, velocity });
        self.send(MidiMessage::NoteOff { note });
    }
}

/// Keeps every message it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub connected: bool,
    pub messages: Vec<MidiMessage>,
}

impl RecordingSink {
    pub fn connected() -> Self {
        Self {
            connected: true,
            messages: Vec::new(),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Note-on messages only (one per triggered hit)
    pub fn note_ons(&self) -> Vec<(u8, u8)> {
        self.messages
            .iter()
            .filter_map(|m| match *m {
                MidiMessage::NoteOn { note, velocity } => Some((note, velocity)),
                MidiMessage::NoteOff { .. } => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl NoteSink for RecordingSink {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(&mut self, msg: MidiMessage) {
        self.messages.push(msg);
    }
}

/// Writes notes to the log; stands in for a MIDI transport
#[derive(Debug, Clone)]
pub struct LogSink {
    connected: bool,
    sent: u64,
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink {
    pub fn new() -> Self {
        Self {
            connected: true,
            sent: 0,
        }
    }

    /// Simulate the transport dropping or reconnecting
    pub fn set_connected(&mut self, connected: bool) {
        if connected != self.connected {
            log::info!(
                "MIDI sink {}",
                if connected { "connected" } else { "disconnected" }
            );
        }
        self.connected = connected;
    }

    /// Messages sent so far
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl NoteSink for LogSink {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(&mut self, msg: MidiMessage) {
        self.sent += 1;
        if let MidiMessage::NoteOn { note, velocity } = msg {
            log::info!(
                "note {} ({}) vel {}",
                note,
                crate::scale::note_name(note),
                velocity
            );
        }
        log::trace!("midi {:02X?}", msg.to_bytes());
    }
}
