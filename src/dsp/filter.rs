use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
State-Variable Filter (TPT)
===========================

Two integrators in a loop produce lowpass, bandpass and highpass at the same
time. The trapezoidal ("topology-preserving transform") form is used because
it stays stable for every cutoff below Nyquist, unlike the classic Chamberlin
form which blows up above ~sr/6.

Coefficients
------------

    g = tan(π · cutoff / sample_rate)     integrator gain
    k = 2 − 2 · resonance                 damping (2 = no peak, → 0 = ringing)
    h = 1 / (1 + g · (g + k))             solves the zero-delay feedback loop

They only depend on cutoff, resonance and sample rate, so they are computed
in the setters and reused for every sample. Changing a parameter never
touches the integrator memory, which keeps parameter sweeps click-free.

Per sample
----------

    v3 = input − ic2
    v1 = h · (ic1 + g · v3)               band
    v2 = ic2 + g · v1                     low
    ic1 = 2·v1 − ic1
    ic2 = 2·v2 − ic2
    high  = input − k·v1 − v2
    notch = input − k·v1

Safe ranges
-----------

  cutoff     [MIN_CUTOFF_HZ, MAX_CUTOFF_RATIO · sample_rate]
  resonance  [0, MAX_RESONANCE]  (k never reaches 0, so no runaway)
*/

pub const MIN_CUTOFF_HZ: f32 = 10.0;
pub const MAX_CUTOFF_RATIO: f32 = 0.45;
pub const MAX_RESONANCE: f32 = 0.98;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    LowPass,
    BandPass,
    HighPass,
    Notch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterOutputs {
    pub low: f32,
    pub band: f32,
    pub high: f32,
    pub notch: f32,
}

impl FilterOutputs {
    #[inline]
    pub fn select(&self, mode: FilterMode) -> f32 {
        match mode {
            FilterMode::LowPass => self.low,
            FilterMode::BandPass => self.band,
            FilterMode::HighPass => self.high,
            FilterMode::Notch => self.notch,
        }
    }
}

pub struct SVFilter {
    ic1eq: f32, // first integrator's memory
    ic2eq: f32, // second integrator's memory

    sample_rate: f32,
    cutoff_hz: f32,
    resonance: f32,

    g: f32,
    k: f32,
    h: f32,
}

impl SVFilter {
    pub fn new(sample_rate: f32, cutoff_hz: f32, resonance: f32) -> Self {
        let mut filter = Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            sample_rate,
            cutoff_hz: 0.0,
            resonance: 0.0,
            g: 0.0,
            k: 2.0,
            h: 1.0,
        };
        filter.cutoff_hz = filter.clamp_cutoff(cutoff_hz);
        filter.resonance = clamp_resonance(resonance);
        filter.update_coefficients();
        filter
    }

    pub fn lowpass(sample_rate: f32, cutoff_hz: f32) -> Self {
        Self::new(sample_rate, cutoff_hz, 0.0)
    }

    fn clamp_cutoff(&self, cutoff_hz: f32) -> f32 {
        let max = self.sample_rate * MAX_CUTOFF_RATIO;
        if cutoff_hz.is_finite() {
            cutoff_hz.clamp(MIN_CUTOFF_HZ, max)
        } else {
            max
        }
    }

    fn update_coefficients(&mut self) {
        self.g = (PI * self.cutoff_hz / self.sample_rate).tan();
        self.k = 2.0 - 2.0 * self.resonance;
        self.h = 1.0 / (1.0 + self.g * (self.g + self.k));
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> FilterOutputs {
        let v3 = input - self.ic2eq;
        let v1 = self.h * (self.ic1eq + self.g * v3);
        let v2 = self.ic2eq + self.g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            low: v2,
            band: v1,
            high: input - self.k * v1 - v2,
            notch: input - self.k * v1,
        }
    }

    /// Filter a block in place, keeping the output selected by `mode`.
    pub fn render(&mut self, buffer: &mut [f32], mode: FilterMode) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample).select(mode);
        }
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        let cutoff_hz = self.clamp_cutoff(cutoff_hz);
        if cutoff_hz != self.cutoff_hz {
            self.cutoff_hz = cutoff_hz;
            self.update_coefficients();
        }
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        let resonance = clamp_resonance(resonance);
        if resonance != self.resonance {
            self.resonance = resonance;
            self.update_coefficients();
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }
}

fn clamp_resonance(resonance: f32) -> f32 {
    if resonance.is_finite() {
        resonance.clamp(0.0, MAX_RESONANCE)
    } else {
        0.0
    }
}
