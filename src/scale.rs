//! Scale and note-name lookup
//!
//! MIDI numbering: C4 = 60, so octave `o` starts at `(o + 1) * 12`.

/// Maps scale degrees to MIDI notes and notes to display names
pub trait NoteProvider {
    /// Number of selectable scales
    fn scale_count(&self) -> usize;

    /// Display name of a scale
    fn scale_name(&self, scale: usize) -> &str;

    /// MIDI note for a degree of `scale` rooted at C in `octave`.
    /// Degrees past the end of the scale continue into the next octave.
    fn note_in_scale(&self, scale: usize, degree: usize, octave: u8) -> u8;

    /// Display name such as "C#4"
    fn note_name(&self, midi: u8) -> String {
        note_name(midi)
    }
}

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Display name of a MIDI note, octave included
pub fn note_name(midi: u8) -> String {
    let octave = (midi / 12) as i32 - 1;
    format!("{}{}", NOTE_NAMES[(midi % 12) as usize], octave)
}

/// Display name of a key (pitch class 0-11)
pub fn key_name(key: u8) -> &'static str {
    NOTE_NAMES[(key % 12) as usize]
}

/// A named interval set
#[derive(Debug, Clone, Copy)]
pub struct Scale {
    pub name: &'static str,
    pub intervals: &'static [u8],
}

impl Scale {
    pub const fn new(name: &'static str, intervals: &'static [u8]) -> Self {
        Self { name, intervals }
    }
}

pub const SCALES: [Scale; 8] = [
    Scale::new("Major", &[0, 2, 4, 5, 7, 9, 11]),
    Scale::new("Minor", &[0, 2, 3, 5, 7, 8, 10]),
    Scale::new("Pentatonic", &[0, 2, 4, 7, 9]),
    Scale::new("Minor Pent", &[0, 3, 5, 7, 10]),
    Scale::new("Blues", &[0, 3, 5, 6, 7, 10]),
    Scale::new("Dorian", &[0, 2, 3, 5, 7, 9, 10]),
    Scale::new("Mixolydian", &[0, 2, 4, 5, 7, 9, 10]),
    Scale::new("Chromatic", &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]),
];

/// Built-in scale table
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaleTable;

impl NoteProvider for ScaleTable {
    fn scale_count(&self) -> usize {
        SCALES.len()
    }

    fn scale_name(&self, scale: usize) -> &str {
        SCALES[scale % SCALES.len()].name
    }

    fn note_in_scale(&self, scale: usize, degree: usize, octave: u8) -> u8 {
        let intervals = SCALES[scale % SCALES.len()].intervals;
        let octave_shift = (degree / intervals.len()) as u32;
        let interval = intervals[degree % intervals.len()] as u32;
        let midi = (octave as u32 + 1 + octave_shift) * 12 + interval;
        midi.min(127) as u8
    }
}

/// Note for `degree` of `scale`, transposed up by `key` semitones.
/// Computed once when an entity is created.
pub fn note_for(
    notes: &dyn NoteProvider,
    scale: usize,
    degree: usize,
    key: u8,
    octave: u8,
) -> (u8, String) {
    let midi = notes
        .note_in_scale(scale, degree, octave)
        .saturating_add(key)
        .min(127);
    (midi, notes.note_name(midi))
}
