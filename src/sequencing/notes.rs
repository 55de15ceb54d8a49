/*
MIDI Notes
==========

Middle C (C4) is MIDI note 60, and A4 = 69 is the 440 Hz tuning reference.
Every semitone multiplies the frequency by 2^(1/12):

    frequency = 440 · 2^((note − 69) / 12)

Note values are `f32` so sequences can hold microtonal steps (60.5 sits a
quarter tone above middle C).

Names follow `<letter><accidental><octave>` where the accidental is `#` or
`s` for sharp and `b` for flat: "C4", "Eb4", "F#3", "Cs5".

    note_number = 12 · (octave + 1) + semitone
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const C4: f32 = 60.0;
pub const A4: f32 = 69.0;
pub const A4_HZ: f32 = 440.0;

/// Convert a (possibly fractional) MIDI note number to Hz.
#[inline]
pub fn mtof(note: f32) -> f32 {
    A4_HZ * 2.0_f32.powf((note - A4) / 12.0)
}

/// Parse a note name such as "Eb4" into a MIDI note number.
pub fn parse_note(name: &str) -> Result<f32, ConfigError> {
    let unknown = || ConfigError::UnknownNote(name.to_string());
    let mut chars = name.trim().chars();

    let semitone: i32 = match chars.next().map(|c| c.to_ascii_uppercase()) {
        Some('C') => 0,
        Some('D') => 2,
        Some('E') => 4,
        Some('F') => 5,
        Some('G') => 7,
        Some('A') => 9,
        Some('B') => 11,
        _ => return Err(unknown()),
    };

    let rest = chars.as_str();
    let (accidental, octave) = match rest.chars().next() {
        Some('#') | Some('s') => (1, &rest[1..]),
        Some('b') => (-1, &rest[1..]),
        _ => (0, rest),
    };

    let octave: i32 = octave.parse().map_err(|_| unknown())?;
    let note = 12 * (octave + 1) + semitone + accidental;
    if !(0..=127).contains(&note) {
        return Err(unknown());
    }

    Ok(note as f32)
}

/// A sequence step as written in configuration: a MIDI number or a note name.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq)]
pub enum NoteValue {
    Number(f32),
    Name(String),
}

impl NoteValue {
    pub fn resolve(&self) -> Result<f32, ConfigError> {
        match self {
            NoteValue::Number(note) => ConfigError::check_range("note", *note, 0.0, 127.0),
            NoteValue::Name(name) => parse_note(name),
        }
    }
}

impl From<f32> for NoteValue {
    fn from(note: f32) -> Self {
        NoteValue::Number(note)
    }
}
