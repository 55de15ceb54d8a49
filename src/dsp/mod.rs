//! Low-level DSP primitives used by the voice and the render engine.
//!
//! These components allocate only at construction and are realtime-safe
//! afterwards, so they can be embedded directly in the render path. They stay
//! focused on the signal-processing math; sequencing and cross-thread control
//! live in the layers above.

/// Circular delay buffer and the feedback delay effect built on it.
pub mod delay;
/// Linear attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Trapezoidal state-variable filter with simultaneous outputs.
pub mod filter;
/// Phase-accumulator oscillator.
pub mod oscillator;

pub use delay::{DelayLine, DelaySettings, FeedbackDelay};
pub use envelope::{Envelope, EnvelopeStage};
pub use filter::{FilterMode, FilterOutputs, SVFilter};
pub use oscillator::{Oscillator, Waveform};
