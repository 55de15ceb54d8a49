#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/*
Feedback Delay
==============

A circular buffer with one write cursor. Reading `d` samples behind the cursor
returns what was written `d` calls ago.

    write_index ─┐
                 ▼
    [ ][ ][x][ ][ ][ ][ ][ ]      capacity = 8
           ▲
           └─ read = (write_index − d) mod capacity


Topology: read before write
---------------------------

Each sample runs

    wet = read()
    write(dry + feedback · wet)
    out = dry · (1 − mix) + wet · mix

Reading first means the sample we are about to write is never part of its own
feedback term, and an impulse written now comes back exactly `d` samples
later. A delay of 0 therefore reads the slot that is about to be overwritten,
which is the oldest sample in the buffer (`capacity` samples ago).

Fractional delays are linearly interpolated between the two neighbouring
samples; integer delays are read exactly.

Capacity is fixed at construction. That is the only allocation; everything
after runs on the render path.
*/

pub struct DelayLine {
    buffer: Box<[f32]>,
    write_index: usize,
    delay_whole: usize,
    delay_frac: f32,
}

impl DelayLine {
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::InvalidCapacity);
        }

        Ok(Self {
            buffer: vec![0.0; capacity].into_boxed_slice(),
            write_index: 0,
            delay_whole: 0,
            delay_frac: 0.0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn max_delay(&self) -> f32 {
        (self.capacity() - 1) as f32
    }

    /// Set the delay in samples. Delays that do not fit the buffer, and
    /// delays strictly between 0 and 1 sample, are a configuration error and
    /// leave the current delay untouched.
    pub fn set_delay(&mut self, samples: f32) -> Result<(), ConfigError> {
        if is_sub_sample(samples) {
            return Err(ConfigError::OutOfRange {
                parameter: "delay_samples",
                value: samples,
                min: 1.0,
                max: self.max_delay(),
            });
        }
        let samples = ConfigError::check_range("delay_samples", samples, 0.0, self.max_delay())?;
        self.store_delay(samples);
        Ok(())
    }

    /// Runtime variant of [`set_delay`](Self::set_delay): clamps instead of
    /// failing. Sub-sample delays round up to one sample.
    pub fn set_delay_clamped(&mut self, samples: f32) {
        let samples = if is_sub_sample(samples) {
            1.0
        } else if samples.is_finite() {
            samples
        } else {
            0.0
        };
        self.store_delay(samples.clamp(0.0, self.max_delay()));
    }

    fn store_delay(&mut self, samples: f32) {
        self.delay_whole = samples as usize;
        self.delay_frac = samples - self.delay_whole as f32;
    }

    pub fn delay(&self) -> f32 {
        self.delay_whole as f32 + self.delay_frac
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_index] = sample;
        self.write_index = (self.write_index + 1) % self.buffer.len();
    }

    #[inline]
    pub fn read(&self) -> f32 {
        let capacity = self.buffer.len();
        let index = (self.write_index + capacity - self.delay_whole) % capacity;
        let a = self.buffer[index];
        if self.delay_frac == 0.0 {
            return a;
        }

        let b = self.buffer[(index + capacity - 1) % capacity];
        a + (b - a) * self.delay_frac
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_index = 0;
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelaySettings {
    /// Delay time in samples.
    pub delay_samples: f32,
    /// Amount of the delayed signal fed back into the line, [0, 1).
    pub feedback: f32,
    /// Wet level in the output, [0, 1]. Dry gets `1 − mix`.
    pub mix: f32,
}

pub const MAX_FEEDBACK: f32 = 0.99;

/// True for delays in (0, 1) samples. Those would interpolate between the
/// newest sample and the slot about to be overwritten.
#[inline]
pub fn is_sub_sample(samples: f32) -> bool {
    samples > 0.0 && samples < 1.0
}

pub struct FeedbackDelay {
    line: DelayLine,
    feedback: f32,
    mix: f32,
}

impl FeedbackDelay {
    pub fn new(capacity: usize, settings: DelaySettings) -> Result<Self, ConfigError> {
        let mut line = DelayLine::new(capacity)?;
        line.set_delay(settings.delay_samples)?;
        // strictly below 1.0; anything at or above never decays
        let feedback = ConfigError::check_range("feedback", settings.feedback, 0.0, MAX_FEEDBACK)?;
        let mix = ConfigError::check_range("mix", settings.mix, 0.0, 1.0)?;

        Ok(Self { line, feedback, mix })
    }

    #[inline]
    pub fn process(&mut self, dry: f32) -> f32 {
        let wet = self.line.read();
        self.line.write(dry + self.feedback * wet);
        dry * (1.0 - self.mix) + wet * self.mix
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn set_delay(&mut self, samples: f32) {
        self.line.set_delay_clamped(samples);
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = if feedback.is_finite() {
            feedback.clamp(0.0, MAX_FEEDBACK)
        } else {
            0.0
        };
    }

    pub fn set_mix(&mut self, mix: f32) {
        self.mix = if mix.is_finite() { mix.clamp(0.0, 1.0) } else { 0.0 };
    }

    pub fn line(&self) -> &DelayLine {
        &self.line
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    pub fn mix(&self) -> f32 {
        self.mix
    }

    pub fn reset(&mut self) {
        self.line.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_returns_after_exactly_d_samples() {
        let delay = 37;
        let mut line = DelayLine::new(128).unwrap();
        line.set_delay(delay as f32).unwrap();

        let mut outputs = Vec::new();
        for n in 0..300 {
            let wet = line.read();
            outputs.push(wet);
            line.write(if n == 10 { 1.0 } else { 0.0 });
        }

        for (n, &value) in outputs.iter().enumerate() {
            if n == 10 + delay {
                assert_eq!(value, 1.0, "impulse missing at {n}");
            } else {
                assert_eq!(value, 0.0, "unexpected output at {n}");
            }
        }
    }

    #[test]
    fn delay_beyond_capacity_is_rejected() {
        let mut line = DelayLine::new(64).unwrap();
        line.set_delay(10.0).unwrap();

        let err = line.set_delay(64.0).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { parameter: "delay_samples", .. }));
        assert_eq!(line.delay(), 10.0, "failed set must not change the delay");

        assert!(line.set_delay(63.0).is_ok());
        assert!(line.set_delay(-1.0).is_err());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(DelayLine::new(0).err(), Some(ConfigError::InvalidCapacity));
    }

    #[test]
    fn clamped_delay_stays_in_buffer() {
        let mut line = DelayLine::new(16).unwrap();
        line.set_delay_clamped(1_000.0);
        assert_eq!(line.delay(), 15.0);
        line.set_delay_clamped(f32::NAN);
        assert_eq!(line.delay(), 0.0);
    }

    #[test]
    fn zero_delay_reads_oldest_sample() {
        let mut line = DelayLine::new(4).unwrap();
        line.set_delay(0.0).unwrap();
        for value in [1.0, 2.0, 3.0, 4.0] {
            line.write(value);
        }
        assert_eq!(line.read(), 1.0);
    }

    #[test]
    fn fractional_delay_interpolates() {
        let mut line = DelayLine::new(16).unwrap();
        line.set_delay(2.5).unwrap();
        for value in [0.0, 0.0, 4.0, 0.0, 0.0] {
            line.write(value);
        }
        // 2 samples ago = 0.0 (index 3), 3 samples ago = 4.0 (index 2)
        assert!((line.read() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn sub_sample_delay_is_rejected() {
        let mut line = DelayLine::new(8).unwrap();
        line.set_delay(3.0).unwrap();

        let err = line.set_delay(0.5).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange { parameter: "delay_samples", min, .. } if min == 1.0
        ));
        assert_eq!(line.delay(), 3.0);
        assert!(line.set_delay(1.0).is_ok());
    }

    #[test]
    fn clamped_sub_sample_delay_reads_newest_sample() {
        let mut line = DelayLine::new(8).unwrap();
        line.set_delay_clamped(0.5);
        assert_eq!(line.delay(), 1.0);

        for value in 1..=8 {
            line.write(value as f32);
        }
        assert_eq!(line.read(), 8.0);

        line.set_delay_clamped(0.0);
        assert_eq!(line.read(), 1.0, "zero still reads the oldest slot");
    }

    #[test]
    fn feedback_repeats_decay_geometrically() {
        let settings = DelaySettings {
            delay_samples: 10.0,
            feedback: 0.5,
            mix: 1.0,
        };
        let mut delay = FeedbackDelay::new(64, settings).unwrap();

        let mut outputs = vec![0.0f32; 40];
        outputs[0] = 1.0;
        delay.render(&mut outputs);

        assert_eq!(outputs[0], 0.0, "fully wet output hides the dry impulse");
        assert_eq!(outputs[10], 1.0);
        assert_eq!(outputs[20], 0.5);
        assert_eq!(outputs[30], 0.25);
        let echoes = outputs.iter().filter(|&&x| x != 0.0).count();
        assert_eq!(echoes, 3);
    }

    #[test]
    fn half_mix_matches_dry_wet_average() {
        let settings = DelaySettings {
            delay_samples: 1.0,
            feedback: 0.0,
            mix: 0.5,
        };
        let mut delay = FeedbackDelay::new(8, settings).unwrap();
        assert_eq!(delay.process(1.0), 0.5);
        assert_eq!(delay.process(0.0), 0.5);
        assert_eq!(delay.process(0.0), 0.0);
    }

    #[test]
    fn unstable_feedback_is_a_configuration_error() {
        let settings = DelaySettings {
            delay_samples: 1.0,
            feedback: 1.0,
            mix: 0.5,
        };
        let err = FeedbackDelay::new(8, settings).err();
        assert!(matches!(err, Some(ConfigError::OutOfRange { parameter: "feedback", .. })));
    }
}
