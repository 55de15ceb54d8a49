//! The control domain: a poll-and-sleep loop that turns clock ticks and the
//! gate input into pitch/gate updates for the render path.
//!
//! Nothing here runs on the audio thread. The only thing shared with the
//! render side is the [`GatePublisher`].

use std::{
    sync::{
        atomic::{AtomicBool, AtomicU32, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use tracing::{debug, info};

use crate::{
    config::{ControlMode, EngineConfig},
    error::ConfigError,
    sequencing::{mtof, StepEvent, StepSequencer},
    synth::{GatePublisher, GateState},
};

/// Monotonic millisecond counter. Wraps after ~49 days; callers use
/// wrapping subtraction.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Milliseconds since construction.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u32 {
        // truncation is the wrap
        self.origin.elapsed().as_millis() as u32
    }
}

/// Hand-driven clock. Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU32>,
}

impl ManualClock {
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: Arc::new(AtomicU32::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: u32) {
        self.now.store(now_ms, Ordering::Release);
    }

    pub fn advance(&self, ms: u32) {
        let now = self.now.load(Ordering::Acquire);
        self.set(now.wrapping_add(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.load(Ordering::Acquire)
    }
}

/// A single raw gate/button line.
pub trait GateInput {
    fn is_high(&mut self) -> bool;
}

impl GateInput for Arc<AtomicBool> {
    fn is_high(&mut self) -> bool {
        self.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// Eight-poll shift register. A level only counts once it has been read the
/// same way eight polls in a row.
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    history: u8,
    pressed: bool,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, raw: bool) -> Option<Edge> {
        self.history = (self.history << 1) | raw as u8;

        match (self.history, self.pressed) {
            (0xFF, false) => {
                self.pressed = true;
                Some(Edge::Rising)
            }
            (0x00, true) => {
                self.pressed = false;
                Some(Edge::Falling)
            }
            _ => None,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

pub enum ControlSource {
    /// Gate held open; nothing to poll.
    Drone,
    Sequencer(StepSequencer),
    Gate {
        input: Box<dyn GateInput + Send>,
        debouncer: Debouncer,
        frequency_hz: f32,
    },
}

impl ControlSource {
    pub fn from_config(
        config: &EngineConfig,
        gate_input: Option<Box<dyn GateInput + Send>>,
    ) -> Result<Self, ConfigError> {
        Ok(match &config.control.mode {
            ControlMode::Drone => ControlSource::Drone,
            ControlMode::Sequencer(sequencer) => ControlSource::Sequencer(sequencer.build()?),
            ControlMode::Gate => ControlSource::Gate {
                input: gate_input.ok_or(ConfigError::MissingGateInput)?,
                debouncer: Debouncer::new(),
                frequency_hz: config.voice.oscillator.frequency_hz,
            },
        })
    }

    /// What the mailbox should hold before the first poll.
    pub fn initial_state(&self, config: &EngineConfig) -> GateState {
        let frequency_hz = config.voice.oscillator.frequency_hz;
        match self {
            ControlSource::Drone => GateState {
                frequency_hz,
                gate: true,
            },
            ControlSource::Sequencer(sequencer) => GateState {
                frequency_hz: mtof(sequencer.sequence().note(0)),
                gate: false,
            },
            ControlSource::Gate { .. } => GateState {
                frequency_hz,
                gate: false,
            },
        }
    }
}

pub struct ControlLoop<C: Clock> {
    clock: C,
    publisher: GatePublisher,
    source: ControlSource,
    tick_interval: Duration,
}

impl<C: Clock> ControlLoop<C> {
    pub fn new(
        clock: C,
        publisher: GatePublisher,
        source: ControlSource,
        tick_interval: Duration,
    ) -> Self {
        Self {
            clock,
            publisher,
            source,
            tick_interval,
        }
    }

    /// Run one control tick.
    pub fn poll(&mut self) {
        let now_ms = self.clock.now_ms();

        match &mut self.source {
            ControlSource::Drone => {}
            ControlSource::Sequencer(sequencer) => match sequencer.tick(now_ms) {
                Some(StepEvent::Step { frequency_hz, .. }) => self.publisher.trigger(frequency_hz),
                Some(StepEvent::GateOff) => self.publisher.release(),
                None => {}
            },
            ControlSource::Gate {
                input,
                debouncer,
                frequency_hz,
            } => match debouncer.update(input.is_high()) {
                Some(Edge::Rising) => {
                    debug!(now_ms, "gate on");
                    self.publisher.trigger(*frequency_hz);
                }
                Some(Edge::Falling) => {
                    debug!(now_ms, "gate off");
                    self.publisher.release();
                }
                None => {}
            },
        }
    }

    /// Poll and sleep until `running` goes false.
    pub fn run(&mut self, running: &AtomicBool) {
        info!(interval = ?self.tick_interval, "control loop started");
        while running.load(Ordering::Acquire) {
            self.poll();
            thread::sleep(self.tick_interval);
        }
        info!("control loop stopped");
    }

    pub fn source(&self) -> &ControlSource {
        &self.source
    }

    pub fn publisher(&self) -> &GatePublisher {
        &self.publisher
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::gate_channel;

    #[test]
    fn debouncer_needs_eight_stable_polls() {
        let mut debouncer = Debouncer::new();
        for _ in 0..7 {
            assert_eq!(debouncer.update(true), None);
        }
        assert_eq!(debouncer.update(true), Some(Edge::Rising));
        assert_eq!(debouncer.update(true), None);
        assert!(debouncer.is_pressed());
    }

    #[test]
    fn debouncer_ignores_bounce() {
        let mut debouncer = Debouncer::new();
        for raw in [true, false, true, true, false, true, true, true] {
            assert_eq!(debouncer.update(raw), None);
        }
        assert!(!debouncer.is_pressed());

        for _ in 0..7 {
            debouncer.update(true);
        }
        assert!(debouncer.is_pressed());
        for _ in 0..7 {
            assert_eq!(debouncer.update(false), None);
        }
        assert_eq!(debouncer.update(false), Some(Edge::Falling));
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(u32::MAX);
        let handle = clock.clone();
        handle.advance(2);
        assert_eq!(clock.now_ms(), 1);
    }

    #[test]
    fn gate_source_publishes_debounced_edges() {
        let config = EngineConfig::mono_synth(48_000.0);
        let line = Arc::new(AtomicBool::new(false));
        let source = ControlSource::from_config(&config, Some(Box::new(Arc::clone(&line)))).unwrap();
        let (tx, mut rx) = gate_channel(source.initial_state(&config));
        let mut control = ControlLoop::new(ManualClock::new(0), tx, source, Duration::from_millis(1));

        line.store(true, Ordering::Release);
        for _ in 0..7 {
            control.poll();
        }
        assert!(!rx.snapshot().gate);

        control.poll();
        let snapshot = rx.snapshot();
        assert!(snapshot.gate && snapshot.triggered);
        assert_eq!(snapshot.frequency_hz, 110.0);

        line.store(false, Ordering::Release);
        for _ in 0..8 {
            control.poll();
        }
        let snapshot = rx.snapshot();
        assert!(!snapshot.gate && !snapshot.triggered);
    }

    #[test]
    fn gate_mode_without_input_is_rejected() {
        let config = EngineConfig::mono_synth(48_000.0);
        assert!(matches!(
            ControlSource::from_config(&config, None),
            Err(ConfigError::MissingGateInput)
        ));
    }

    #[test]
    fn drone_starts_open() {
        let config = EngineConfig::sine_wave(48_000.0);
        let source = ControlSource::from_config(&config, None).unwrap();
        assert_eq!(
            source.initial_state(&config),
            GateState {
                frequency_hz: 440.0,
                gate: true
            }
        );
    }

    #[test]
    fn sequencer_source_follows_the_clock() {
        let config = EngineConfig::sequencer(48_000.0);
        let source = ControlSource::from_config(&config, None).unwrap();
        let (tx, mut rx) = gate_channel(source.initial_state(&config));
        let clock = ManualClock::new(0);
        let mut control = ControlLoop::new(clock.clone(), tx, source, Duration::from_millis(1));

        control.poll();
        let first = rx.snapshot();
        assert!(first.triggered && first.gate);
        assert!((first.frequency_hz - mtof(60.0)).abs() < 1e-3);

        clock.set(250);
        control.poll();
        assert!(!rx.snapshot().gate, "250 ms gate length elapsed");

        clock.set(500);
        control.poll();
        let second = rx.snapshot();
        assert!(second.triggered && second.gate);
        assert!((second.frequency_hz - mtof(62.0)).abs() < 1e-3);
    }

    #[test]
    fn run_returns_once_stopped() {
        let config = EngineConfig::sine_wave(48_000.0);
        let source = ControlSource::from_config(&config, None).unwrap();
        let (tx, _rx) = gate_channel(source.initial_state(&config));
        let mut control = ControlLoop::new(SystemClock::new(), tx, source, Duration::from_millis(1));

        let running = AtomicBool::new(false);
        control.run(&running);
    }
}
