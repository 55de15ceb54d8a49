/*
ADSR Envelope
=============

A linear attack/decay/sustain/release generator. The envelope produces a gain
multiplier in [0, 1] once per sample and is driven by the gate level.

Vocabulary
----------

  level       Current output value (0.0 to 1.0).

  stage       Idle, Attack, Decay, Sustain or Release.

  gate        Note held (true) or released (false). Sampled every call to
              `process`.

  retrigger   Restart the attack while the gate is already high. Used by the
              step sequencer for consecutive notes.


The Shape
---------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
         A     D      S        R

All segments are straight lines. Each stage has a fixed per-sample rate:

    attack   +1.0 / (attack_time · sample_rate)
    decay    −(1.0 − sustain) / (decay_time · sample_rate)
    release  −start_level / (release_time · sample_rate)

The release rate is snapshotted when the release begins, so the ramp always
lands on exactly 0.0 after `release_time` no matter where it started.

A segment time of 0 means the transition happens within the current sample.


The State Machine
-----------------

    Idle ──gate on──→ Attack ──level=1──→ Decay ──level=S──→ Sustain
     ↑                  │  ↑                │                  │
     │                  │  └──retrigger─────┴──────────────────┘
     │               gate off              gate off          gate off
     │                  ↓                   ↓                  ↓
     └───level=0──── Release ←──────────────┴──────────────────┘
                        │
                        └──gate on──→ Attack

Retriggers and gate-on during release start the attack from the CURRENT level
instead of forcing 0.0, so there is never a step in the output.
*/

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,    // gate low, level = 0
    Attack,  // ramping up to 1.0
    Decay,   // ramping down to sustain level
    Sustain, // holding while gate is high
    Release, // ramping down to 0
}

pub struct Envelope {
    sample_rate: f32,

    attack_time: f32,   // seconds to ramp 0 → 1
    decay_time: f32,    // seconds to ramp 1 → sustain
    sustain_level: f32, // 0.0 - 1.0
    release_time: f32,  // seconds to ramp current → 0

    stage: EnvelopeStage,
    level: f32,

    // per-sample step for the release, fixed at release start
    release_step: f32,
}

impl Envelope {
    pub fn adsr(sample_rate: f32, attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            sample_rate,
            attack_time: sanitize_time(attack),
            decay_time: sanitize_time(decay),
            sustain_level: sanitize_level(sustain),
            release_time: sanitize_time(release),
            stage: EnvelopeStage::Idle,
            level: 0.0,
            release_step: 0.0,
        }
    }

    /// Advance one sample with the given gate level and return the new level.
    pub fn process(&mut self, gate: bool) -> f32 {
        match (gate, self.stage) {
            (true, EnvelopeStage::Idle | EnvelopeStage::Release) => {
                self.stage = EnvelopeStage::Attack;
            }
            (false, EnvelopeStage::Attack | EnvelopeStage::Decay | EnvelopeStage::Sustain) => {
                self.begin_release();
            }
            _ => {}
        }

        self.step();
        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Restart the attack from the current level. Has no effect while idle;
    /// the next `process(true)` starts the attack anyway.
    pub fn retrigger(&mut self) {
        if self.stage != EnvelopeStage::Idle {
            self.stage = EnvelopeStage::Attack;
        }
    }

    fn begin_release(&mut self) {
        let samples = self.release_time * self.sample_rate;
        self.release_step = if samples < 1.0 {
            self.level
        } else {
            self.level / samples
        };
        self.stage = EnvelopeStage::Release;
    }

    fn step(&mut self) {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }

            EnvelopeStage::Attack => {
                self.level += rate(1.0, self.attack_time, self.sample_rate);
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeStage::Decay;
                }
            }

            EnvelopeStage::Decay => {
                let target = self.sustain_level;
                if self.level > target {
                    let step = rate(1.0 - target, self.decay_time, self.sample_rate);
                    self.level = (self.level - step).max(target);
                } else {
                    // sustain was raised above the current level
                    let step = rate(1.0, self.decay_time, self.sample_rate);
                    self.level = (self.level + step).min(target);
                }
                if self.level == target {
                    self.stage = EnvelopeStage::Sustain;
                }
            }

            EnvelopeStage::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeStage::Release => {
                self.level -= self.release_step;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }
    }

    /// Render a block of envelope values with a constant gate.
    pub fn render(&mut self, buffer: &mut [f32], gate: bool) {
        for sample in buffer.iter_mut() {
            *sample = self.process(gate);
        }
    }

    pub fn set_attack(&mut self, seconds: f32) {
        self.attack_time = sanitize_time(seconds);
    }

    pub fn set_decay(&mut self, seconds: f32) {
        self.decay_time = sanitize_time(seconds);
    }

    pub fn set_sustain(&mut self, level: f32) {
        self.sustain_level = sanitize_level(level);
        // the new level is reached by ramping at the decay rate, never by jumping
        if self.stage == EnvelopeStage::Sustain && self.level != self.sustain_level {
            self.stage = EnvelopeStage::Decay;
        }
    }

    /// Takes effect at the next release; a release in progress keeps its rate.
    pub fn set_release(&mut self, seconds: f32) {
        self.release_time = sanitize_time(seconds);
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
        self.release_step = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn sustain_level(&self) -> f32 {
        self.sustain_level
    }
}

/// Per-sample increment covering `span` in `seconds`. Zero time covers the
/// whole span at once.
#[inline]
fn rate(span: f32, seconds: f32, sample_rate: f32) -> f32 {
    let samples = seconds * sample_rate;
    if samples < 1.0 {
        span.max(f32::MIN_POSITIVE)
    } else {
        span / samples
    }
}

fn sanitize_time(seconds: f32) -> f32 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    }
}

fn sanitize_level(level: f32) -> f32 {
    if level.is_finite() {
        level.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
