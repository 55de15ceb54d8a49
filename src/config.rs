//! Engine configuration.
//!
//! Everything is explicit: there is no `Default` that would quietly build a
//! silent engine. Start from one of the presets (they mirror the classic
//! sine / mono synth / sequencer / delay patches) and adjust fields, or
//! deserialize a full tree with the `serde` feature.
//!
//! [`EngineConfig::validate`] is the single gate between configuration and
//! the render path: once it passes, the engine never reports an error again.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        delay::{is_sub_sample, MAX_FEEDBACK},
        filter::{FilterMode, MAX_RESONANCE},
        DelaySettings, Waveform,
    },
    error::ConfigError,
    sequencing::{NoteValue, Sequence, StepSequencer},
    MAX_BLOCK_SIZE,
};

/// Longest envelope segment accepted at setup.
pub const MAX_SEGMENT_SECONDS: f32 = 60.0;
/// Longest delay buffer accepted at setup.
pub const MAX_DELAY_SECONDS: f32 = 10.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct OscillatorConfig {
    pub waveform: Waveform,
    pub frequency_hz: f32,
    pub amplitude: f32,
    #[cfg_attr(feature = "serde", serde(default = "default_pulse_width"))]
    pub pulse_width: f32,
}

#[cfg(feature = "serde")]
fn default_pulse_width() -> f32 {
    0.5
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub cutoff_hz: f32,
    pub resonance: f32,
    pub mode: FilterMode,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeConfig {
    pub attack_s: f32,
    pub decay_s: f32,
    pub sustain_level: f32,
    pub release_s: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    pub oscillator: OscillatorConfig,
    pub filter: FilterConfig,
    pub envelope: EnvelopeConfig,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct DelayConfig {
    /// Buffer length; fixes the longest delay the engine can ever use.
    pub max_delay_s: f32,
    pub delay_s: f32,
    pub feedback: f32,
    pub mix: f32,
}

impl DelayConfig {
    pub fn capacity(&self, sample_rate: f32) -> usize {
        (self.max_delay_s * sample_rate).ceil() as usize + 1
    }

    pub fn settings(&self, sample_rate: f32) -> DelaySettings {
        DelaySettings {
            delay_samples: self.delay_s * sample_rate,
            feedback: self.feedback,
            mix: self.mix,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerConfig {
    pub notes: Vec<NoteValue>,
    pub step_ms: u32,
    pub gate_ms: u32,
}

impl SequencerConfig {
    pub fn build(&self) -> Result<StepSequencer, ConfigError> {
        let sequence = Sequence::from_values(&self.notes)?;
        StepSequencer::new(sequence, self.step_ms, self.gate_ms)
    }
}

/// Where the render path takes its dry signal from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSource {
    /// The synth voice.
    Voice,
    /// Input channel 0.
    Input,
}

/// What drives the gate mailbox.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", rename_all = "lowercase"))]
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMode {
    /// Gate held open at the oscillator frequency.
    Drone,
    /// Gate follows the gate/button input.
    Gate,
    /// Pitch and gate come from the step sequencer.
    Sequencer(SequencerConfig),
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ControlConfig {
    /// Sleep between control polls.
    pub tick_interval_ms: u64,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub mode: ControlMode,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Samples per render block. A build-time constant of the host, never
    /// discovered from the callback.
    pub block_size: usize,
    pub source: SignalSource,
    pub voice: VoiceConfig,
    pub delay: Option<DelayConfig>,
    pub control: ControlConfig,
}

impl EngineConfig {
    /// 440 Hz sine at half amplitude, gate held open.
    pub fn sine_wave(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            block_size: 4,
            source: SignalSource::Voice,
            voice: VoiceConfig {
                oscillator: OscillatorConfig {
                    waveform: Waveform::Sine,
                    frequency_hz: 440.0,
                    amplitude: 0.5,
                    pulse_width: 0.5,
                },
                filter: open_filter(sample_rate),
                envelope: EnvelopeConfig {
                    attack_s: 0.0,
                    decay_s: 0.0,
                    sustain_level: 1.0,
                    release_s: 0.0,
                },
            },
            delay: None,
            control: ControlConfig {
                tick_interval_ms: 100,
                mode: ControlMode::Drone,
            },
        }
    }

    /// Saw through a resonant lowpass, shaped by an ADSR on the gate input.
    pub fn mono_synth(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            block_size: 4,
            source: SignalSource::Voice,
            voice: VoiceConfig {
                oscillator: OscillatorConfig {
                    waveform: Waveform::Saw,
                    frequency_hz: 110.0,
                    amplitude: 0.5,
                    pulse_width: 0.5,
                },
                filter: FilterConfig {
                    cutoff_hz: 500.0,
                    resonance: 0.5,
                    mode: FilterMode::LowPass,
                },
                envelope: EnvelopeConfig {
                    attack_s: 0.01,
                    decay_s: 0.1,
                    sustain_level: 0.5,
                    release_s: 0.2,
                },
            },
            delay: None,
            control: ControlConfig {
                tick_interval_ms: 1,
                mode: ControlMode::Gate,
            },
        }
    }

    /// Triangle plucks stepping through a C minor-ish scale every 500 ms.
    pub fn sequencer(sample_rate: f32) -> Self {
        let notes = [60.0, 62.0, 63.0, 65.0, 67.0, 69.0, 71.0, 72.0]
            .into_iter()
            .map(NoteValue::from)
            .collect();

        Self {
            sample_rate,
            block_size: 4,
            source: SignalSource::Voice,
            voice: VoiceConfig {
                oscillator: OscillatorConfig {
                    waveform: Waveform::Triangle,
                    frequency_hz: 261.63,
                    amplitude: 0.5,
                    pulse_width: 0.5,
                },
                filter: open_filter(sample_rate),
                envelope: EnvelopeConfig {
                    attack_s: 0.01,
                    decay_s: 0.1,
                    sustain_level: 0.0,
                    release_s: 0.1,
                },
            },
            delay: None,
            control: ControlConfig {
                tick_interval_ms: 1,
                mode: ControlMode::Sequencer(SequencerConfig {
                    notes,
                    step_ms: 500,
                    gate_ms: 250,
                }),
            },
        }
    }

    /// Input through a 500 ms echo with 50% feedback, mixed half wet.
    pub fn feedback_delay(sample_rate: f32) -> Self {
        Self {
            source: SignalSource::Input,
            delay: Some(DelayConfig {
                max_delay_s: 1.0,
                delay_s: 0.5,
                feedback: 0.5,
                mix: 0.5,
            }),
            ..Self::sine_wave(sample_rate)
        }
    }

    pub fn nyquist(&self) -> f32 {
        self.sample_rate * 0.5
    }

    /// Check every parameter against its setup range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::InvalidBlockSize {
                size: self.block_size,
                max: MAX_BLOCK_SIZE,
            });
        }

        let nyquist = self.nyquist();
        let osc = &self.voice.oscillator;
        ConfigError::check_range("frequency_hz", osc.frequency_hz, f32::MIN_POSITIVE, nyquist)?;
        ConfigError::check_range("amplitude", osc.amplitude, 0.0, 1.0)?;
        ConfigError::check_range("pulse_width", osc.pulse_width, 0.01, 0.99)?;

        let filter = &self.voice.filter;
        ConfigError::check_range("cutoff_hz", filter.cutoff_hz, f32::MIN_POSITIVE, nyquist)?;
        ConfigError::check_range("resonance", filter.resonance, 0.0, MAX_RESONANCE)?;

        let env = &self.voice.envelope;
        ConfigError::check_range("attack_s", env.attack_s, 0.0, MAX_SEGMENT_SECONDS)?;
        ConfigError::check_range("decay_s", env.decay_s, 0.0, MAX_SEGMENT_SECONDS)?;
        ConfigError::check_range("sustain_level", env.sustain_level, 0.0, 1.0)?;
        ConfigError::check_range("release_s", env.release_s, 0.0, MAX_SEGMENT_SECONDS)?;

        if let Some(delay) = &self.delay {
            ConfigError::check_range(
                "max_delay_s",
                delay.max_delay_s,
                1.0 / self.sample_rate,
                MAX_DELAY_SECONDS,
            )?;
            ConfigError::check_range("delay_s", delay.delay_s, 0.0, delay.max_delay_s)?;
            if is_sub_sample(delay.settings(self.sample_rate).delay_samples) {
                return Err(ConfigError::OutOfRange {
                    parameter: "delay_s",
                    value: delay.delay_s,
                    min: 1.0 / self.sample_rate,
                    max: delay.max_delay_s,
                });
            }
            ConfigError::check_range("feedback", delay.feedback, 0.0, MAX_FEEDBACK)?;
            ConfigError::check_range("mix", delay.mix, 0.0, 1.0)?;
        }

        if self.control.tick_interval_ms == 0 {
            return Err(ConfigError::OutOfRange {
                parameter: "tick_interval_ms",
                value: 0.0,
                min: 1.0,
                max: f32::MAX,
            });
        }
        if let ControlMode::Sequencer(sequencer) = &self.control.mode {
            sequencer.build()?;
        }

        Ok(())
    }
}

fn open_filter(sample_rate: f32) -> FilterConfig {
    FilterConfig {
        cutoff_hz: sample_rate * crate::dsp::filter::MAX_CUTOFF_RATIO,
        resonance: 0.0,
        mode: FilterMode::LowPass,
    }
}
