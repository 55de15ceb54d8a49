//! Control-rate step sequencer.
//!
//! Runs on the control loop, not the audio thread: it only looks at a
//! millisecond clock and reports what changed. Publishing the result to the
//! render path is the caller's job (see [`crate::engine::control`]).

use tracing::{trace, warn};

use super::notes::{mtof, NoteValue};
use crate::error::ConfigError;

/*
Step Timing
===========

    now − last_step ≥ step_ms   →  advance one step, last_step = now
    now − last_step ≥ gate_ms   →  close the gate (once per step)

Subtraction is wrapping, so the u32 millisecond counter may roll over.

Catch-up policy: missed steps are dropped. However late `tick` is called, it
advances at most one step and re-anchors the grid at `now`. A stalled
control loop therefore slows the pattern down instead of bursting through
several notes at once.

A gate length of `step_ms` or more keeps the gate open across steps; each new
step still retriggers the envelope.
*/

#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    notes: Vec<f32>,
}

impl Sequence {
    pub fn new(notes: impl IntoIterator<Item = f32>) -> Result<Self, ConfigError> {
        let notes = notes
            .into_iter()
            .map(|note| ConfigError::check_range("note", note, 0.0, 127.0))
            .collect::<Result<Vec<_>, _>>()?;

        if notes.is_empty() {
            return Err(ConfigError::EmptySequence);
        }

        Ok(Self { notes })
    }

    pub fn from_values(values: &[NoteValue]) -> Result<Self, ConfigError> {
        let notes = values
            .iter()
            .map(NoteValue::resolve)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(notes)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn note(&self, index: usize) -> f32 {
        self.notes[index % self.notes.len()]
    }

    pub fn notes(&self) -> &[f32] {
        &self.notes
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepEvent {
    /// A new step began: retrigger the voice at this pitch with the gate open.
    Step { index: usize, frequency_hz: f32 },
    /// The gate time of the current step ran out.
    GateOff,
}

pub struct StepSequencer {
    sequence: Sequence,
    step_ms: u32,
    gate_ms: u32,
    step_index: usize,
    last_step_ms: u32,
    gate_open: bool,
    started: bool,
}

impl StepSequencer {
    pub fn new(sequence: Sequence, step_ms: u32, gate_ms: u32) -> Result<Self, ConfigError> {
        if step_ms == 0 {
            return Err(ConfigError::InvalidStepDuration);
        }

        Ok(Self {
            sequence,
            step_ms,
            gate_ms,
            step_index: 0,
            last_step_ms: 0,
            gate_open: false,
            started: false,
        })
    }

    /// Anchor the clock at `now_ms` and emit step 0.
    pub fn start(&mut self, now_ms: u32) -> StepEvent {
        self.started = true;
        self.step_index = 0;
        self.last_step_ms = now_ms;
        self.gate_open = true;
        self.current_event()
    }

    /// Run one control tick. Returns at most one event.
    pub fn tick(&mut self, now_ms: u32) -> Option<StepEvent> {
        if !self.started {
            return Some(self.start(now_ms));
        }

        let elapsed = now_ms.wrapping_sub(self.last_step_ms);

        if elapsed >= self.step_ms {
            self.step_index = (self.step_index + 1) % self.sequence.len();
            self.last_step_ms = now_ms;
            self.gate_open = true;

            let event = self.current_event();
            trace!(step = self.step_index, now_ms, "sequencer step");
            return Some(event);
        }

        if self.gate_open && self.gate_ms < self.step_ms && elapsed >= self.gate_ms {
            self.gate_open = false;
            return Some(StepEvent::GateOff);
        }

        None
    }

    fn current_event(&self) -> StepEvent {
        StepEvent::Step {
            index: self.step_index,
            frequency_hz: self.current_frequency(),
        }
    }

    pub fn set_step_duration(&mut self, step_ms: u32) {
        if step_ms == 0 {
            warn!("step duration of 0 ms clamped to 1 ms");
        }
        self.step_ms = step_ms.max(1);
    }

    pub fn set_gate_length(&mut self, gate_ms: u32) {
        self.gate_ms = gate_ms;
    }

    /// Restart from step 0 on the next tick.
    pub fn reset(&mut self) {
        self.started = false;
        self.step_index = 0;
        self.gate_open = false;
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn current_frequency(&self) -> f32 {
        mtof(self.sequence.note(self.step_index))
    }

    pub fn is_gate_open(&self) -> bool {
        self.gate_open
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }
}
