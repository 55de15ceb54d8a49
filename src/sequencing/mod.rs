//! Control-rate sequencing: note numbers and the timer-driven step sequencer.

pub mod notes;
pub mod step;

pub use notes::{mtof, parse_note, NoteValue};
pub use step::{Sequence, StepEvent, StepSequencer};
