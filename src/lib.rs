//! A small realtime monophonic synth core.
//!
//! Two domains share the crate: the render path ([`engine::RenderEngine`]),
//! which runs inside the audio callback and never allocates or blocks, and
//! the control path ([`engine::control::ControlLoop`]), which polls a clock
//! and a gate input and publishes pitch/gate through a lock-free mailbox.

pub mod config;
pub mod dsp; // Oscillator, envelope, filter, delay
pub mod engine;
pub mod error;
pub mod sequencing; // Note numbers and the step sequencer
pub mod synth; // The voice and its control channels

pub use config::EngineConfig;
pub use engine::RenderEngine;
pub use error::ConfigError;

pub const MAX_BLOCK_SIZE: usize = 2048;
/// Lowest oscillator frequency; keeps the phase increment positive.
pub const MIN_FREQUENCY: f32 = 0.01;
