use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::MIN_FREQUENCY;

/*
Phase-Accumulator Oscillator
============================

The oscillator keeps a single number, `phase`, that walks from 0.0 up to 1.0
once per cycle and then wraps. Every waveform is just a different way of
reading that ramp.

    increment = frequency / sample_rate

At 440 Hz and 48 kHz the phase grows by ~0.00917 per sample, so it takes
~109 samples to complete one cycle.


Waveforms
---------

  phase     0.0 ────────── 0.5 ────────── 1.0

  Sine      sin(2π·phase)                       pure tone, no harmonics
  Saw       2·phase − 1         -1 ╱╱╱ +1       all harmonics, bright
  Triangle  1 − 4·|phase − 0.5| -1 ╱╲ -1        odd harmonics, soft
  Square    +1 below pulse width, −1 above      odd harmonics, hollow


Ordering
--------

`process()` advances the phase first and then reads the waveform, so a
frequency change made between two calls is applied to the very next sample
and the phase itself never jumps. Only the slope of the ramp changes.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Saw,
    Triangle,
    Square,
}

pub struct Oscillator {
    sample_rate: f32,
    phase: f32,
    increment: f32,
    frequency_hz: f32,
    amplitude: f32,
    pulse_width: f32,
    waveform: Waveform,
}

impl Oscillator {
    pub fn new(sample_rate: f32, waveform: Waveform, frequency_hz: f32, amplitude: f32) -> Self {
        let mut osc = Self {
            sample_rate,
            phase: 0.0,
            increment: 0.0,
            frequency_hz: 0.0,
            amplitude: amplitude.max(0.0),
            pulse_width: 0.5,
            waveform,
        };
        osc.set_frequency(frequency_hz);
        osc
    }

    /// Set the pitch. Non-positive values clamp to `MIN_FREQUENCY`, values
    /// above Nyquist clamp to Nyquist.
    pub fn set_frequency(&mut self, frequency_hz: f32) {
        let nyquist = self.sample_rate * 0.5;
        let frequency_hz = if frequency_hz.is_finite() {
            frequency_hz.clamp(MIN_FREQUENCY, nyquist)
        } else {
            MIN_FREQUENCY
        };
        self.frequency_hz = frequency_hz;
        self.increment = frequency_hz / self.sample_rate;
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = if amplitude.is_finite() { amplitude.max(0.0) } else { 0.0 };
    }

    /// Duty cycle of the square wave, kept away from 0 and 1 so the wave never
    /// degenerates into DC.
    pub fn set_pulse_width(&mut self, pulse_width: f32) {
        self.pulse_width = if pulse_width.is_finite() {
            pulse_width.clamp(0.01, 0.99)
        } else {
            0.5
        };
    }

    /// Advance the phase by one sample and return the waveform value.
    #[inline]
    pub fn process(&mut self) -> f32 {
        self.phase += self.increment;
        self.phase -= self.phase.floor();
        // fract() of a value a hair below an integer can round up to 1.0
        if self.phase >= 1.0 {
            self.phase = 0.0;
        }

        let value = match self.waveform {
            Waveform::Sine => (TAU * self.phase).sin(),
            Waveform::Saw => 2.0 * self.phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (self.phase - 0.5).abs(),
            Waveform::Square => {
                if self.phase < self.pulse_width {
                    1.0
                } else {
                    -1.0
                }
            }
        };

        value * self.amplitude
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process();
        }
    }

    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn frequency(&self) -> f32 {
        self.frequency_hz
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }
}
