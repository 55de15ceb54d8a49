//! Lock-free pitch/gate hand-off from the control loop to the render path.
//!
//! The control loop owns the only [`GatePublisher`], the render engine owns the
//! only [`GateReceiver`]. Both sides exchange one `AtomicU64` that always holds
//! a complete [`GateState`], so the render path can never observe a new pitch
//! paired with a stale gate (or the other way round).

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/*
Packed Layout
=============

    63                    33  32  31                     0
    ┌───────────────────────┬───┬────────────────────────┐
    │ trigger counter (31)  │ G │ frequency (f32 bits)   │
    └───────────────────────┴───┴────────────────────────┘

A retrigger is an edge, not a level: the publisher bumps the counter and the
receiver reports `triggered` whenever the counter differs from the last one
it saw. Several triggers between two blocks collapse into one, which is what
"latest value wins" means for an edge.

Stores use Release and loads use Acquire. Nothing else is shared.
*/

const FREQUENCY_MASK: u64 = 0xFFFF_FFFF;
const GATE_BIT: u64 = 1 << 32;
const COUNTER_SHIFT: u32 = 33;
const COUNTER_MASK: u32 = (1 << 31) - 1;

/// Pitch and gate level as published by the control loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateState {
    pub frequency_hz: f32,
    pub gate: bool,
}

/// What the render path sees at a block boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateSnapshot {
    pub frequency_hz: f32,
    pub gate: bool,
    /// A retrigger was published since the previous snapshot.
    pub triggered: bool,
}

#[inline]
fn pack(state: GateState, counter: u32) -> u64 {
    let mut bits = state.frequency_hz.to_bits() as u64;
    if state.gate {
        bits |= GATE_BIT;
    }
    bits | (((counter & COUNTER_MASK) as u64) << COUNTER_SHIFT)
}

#[inline]
fn unpack(bits: u64) -> (GateState, u32) {
    let state = GateState {
        frequency_hz: f32::from_bits((bits & FREQUENCY_MASK) as u32),
        gate: bits & GATE_BIT != 0,
    };
    (state, (bits >> COUNTER_SHIFT) as u32)
}

/// Create the single producer/consumer pair, starting from `initial`.
pub fn gate_channel(initial: GateState) -> (GatePublisher, GateReceiver) {
    let shared = Arc::new(AtomicU64::new(pack(initial, 0)));

    let publisher = GatePublisher {
        shared: Arc::clone(&shared),
        state: initial,
        counter: 0,
    };
    let receiver = GateReceiver {
        shared,
        last_counter: 0,
    };

    (publisher, receiver)
}

/// Control-side handle. Not `Clone`: there is exactly one writer.
pub struct GatePublisher {
    shared: Arc<AtomicU64>,
    state: GateState,
    counter: u32,
}

impl GatePublisher {
    /// Overwrite pitch and gate level without a retrigger edge.
    pub fn publish(&mut self, state: GateState) {
        self.state = state;
        self.store();
    }

    /// Open the gate at `frequency_hz` and retrigger the envelope.
    pub fn trigger(&mut self, frequency_hz: f32) {
        self.state = GateState {
            frequency_hz,
            gate: true,
        };
        self.counter = self.counter.wrapping_add(1) & COUNTER_MASK;
        self.store();
    }

    /// Close the gate, keeping the current pitch.
    pub fn release(&mut self) {
        self.state.gate = false;
        self.store();
    }

    fn store(&self) {
        self.shared
            .store(pack(self.state, self.counter), Ordering::Release);
    }

    pub fn state(&self) -> GateState {
        self.state
    }
}

/// Render-side handle. Not `Clone`: there is exactly one reader.
pub struct GateReceiver {
    shared: Arc<AtomicU64>,
    last_counter: u32,
}

impl GateReceiver {
    /// Read the latest state and consume any pending retrigger edge.
    #[inline]
    pub fn snapshot(&mut self) -> GateSnapshot {
        let (state, counter) = unpack(self.shared.load(Ordering::Acquire));
        let triggered = counter != self.last_counter;
        self.last_counter = counter;

        GateSnapshot {
            frequency_hz: state.frequency_hz,
            gate: state.gate,
            triggered,
        }
    }

    /// Read the latest state without consuming the edge.
    pub fn peek(&self) -> GateState {
        unpack(self.shared.load(Ordering::Acquire)).0
    }
}
