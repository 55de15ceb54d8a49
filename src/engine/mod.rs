//! The render domain and the wiring between the two domains.
//!
//! [`RenderEngine`] is the object the audio callback owns. It reads the gate
//! mailbox once per block, renders the voice (or passes the input through),
//! runs the optional feedback delay and fans the mono result out to every
//! output channel. It never allocates, locks or fails after construction.

pub mod control;

use std::time::Duration;

use tracing::info;

use crate::{
    config::{EngineConfig, SignalSource},
    dsp::FeedbackDelay,
    error::ConfigError,
    synth::{gate_channel, GateReceiver, MessageReceiver, ParamMessage, Voice},
};

use self::control::{Clock, ControlLoop, ControlSource, GateInput};

pub struct RenderEngine {
    voice: Voice,
    delay: Option<FeedbackDelay>,
    source: SignalSource,
    gate: GateReceiver,
    block_size: usize,
    scratch: Box<[f32]>,
}

impl RenderEngine {
    pub fn new(config: &EngineConfig, gate: GateReceiver) -> Result<Self, ConfigError> {
        config.validate()?;

        let sample_rate = config.sample_rate;
        let delay = config
            .delay
            .as_ref()
            .map(|delay| FeedbackDelay::new(delay.capacity(sample_rate), delay.settings(sample_rate)))
            .transpose()?;

        info!(
            sample_rate,
            block_size = config.block_size,
            source = ?config.source,
            delay = delay.is_some(),
            "render engine ready"
        );

        Ok(Self {
            voice: Voice::new(sample_rate, &config.voice),
            delay,
            source: config.source,
            gate,
            block_size: config.block_size,
            scratch: vec![0.0; config.block_size].into_boxed_slice(),
        })
    }

    /// Render planar channels. Frames beyond the shortest output channel are
    /// left untouched; missing or short input reads as silence.
    pub fn render(&mut self, input: &[&[f32]], output: &mut [&mut [f32]]) {
        let frames = output.iter().map(|channel| channel.len()).min().unwrap_or(0);
        let dry = input.first().copied().unwrap_or(&[]);

        self.run(
            frames,
            |frame| dry.get(frame).copied().unwrap_or(0.0),
            |offset, block| {
                for channel in output.iter_mut() {
                    channel[offset..offset + block.len()].copy_from_slice(block);
                }
            },
        );
    }

    /// Render interleaved buffers, as handed over by most audio hosts.
    pub fn render_interleaved(
        &mut self,
        input: &[f32],
        input_channels: usize,
        output: &mut [f32],
        output_channels: usize,
    ) {
        if output_channels == 0 {
            return;
        }
        let frames = output.len() / output_channels;
        let input_channels = input_channels.max(1);

        self.run(
            frames,
            |frame| input.get(frame * input_channels).copied().unwrap_or(0.0),
            |offset, block| {
                for (i, &sample) in block.iter().enumerate() {
                    let start = (offset + i) * output_channels;
                    output[start..start + output_channels].fill(sample);
                }
            },
        );
    }

    fn run<I, W>(&mut self, frames: usize, input_at: I, mut write: W)
    where
        I: Fn(usize) -> f32,
        W: FnMut(usize, &[f32]),
    {
        let mut offset = 0;
        while offset < frames {
            let len = (frames - offset).min(self.block_size);
            let block = &mut self.scratch[..len];

            match self.source {
                SignalSource::Voice => {
                    let snapshot = self.gate.snapshot();
                    self.voice.render(block, snapshot);
                }
                SignalSource::Input => {
                    for (i, sample) in block.iter_mut().enumerate() {
                        *sample = input_at(offset + i);
                    }
                }
            }

            if let Some(delay) = self.delay.as_mut() {
                delay.render(block);
            }

            write(offset, block);
            offset += len;
        }
    }

    /// Apply a parameter change. Out-of-range values are clamped.
    pub fn apply(&mut self, message: ParamMessage) {
        match message {
            ParamMessage::SetDelaySamples(samples) => {
                if let Some(delay) = self.delay.as_mut() {
                    delay.set_delay(samples);
                }
            }
            ParamMessage::SetFeedback(feedback) => {
                if let Some(delay) = self.delay.as_mut() {
                    delay.set_feedback(feedback);
                }
            }
            ParamMessage::SetDelayMix(mix) => {
                if let Some(delay) = self.delay.as_mut() {
                    delay.set_mix(mix);
                }
            }
            ParamMessage::Panic => {
                self.voice.reset();
                if let Some(delay) = self.delay.as_mut() {
                    delay.reset();
                }
            }
            other => {
                self.voice.apply(other);
            }
        }
    }

    /// Apply every pending message. Call at a block boundary.
    pub fn drain(&mut self, receiver: &mut impl MessageReceiver) {
        while let Some(message) = receiver.pop() {
            self.apply(message);
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn voice(&self) -> &Voice {
        &self.voice
    }

    pub fn delay(&self) -> Option<&FeedbackDelay> {
        self.delay.as_ref()
    }
}

/// Build both domains from one configuration, connected by a fresh gate
/// mailbox. `gate_input` is only required in gate mode.
pub fn build<C: Clock>(
    config: &EngineConfig,
    clock: C,
    gate_input: Option<Box<dyn GateInput + Send>>,
) -> Result<(RenderEngine, ControlLoop<C>), ConfigError> {
    let source = ControlSource::from_config(config, gate_input)?;
    let (publisher, receiver) = gate_channel(source.initial_state(config));

    let engine = RenderEngine::new(config, receiver)?;
    let control = ControlLoop::new(
        clock,
        publisher,
        source,
        Duration::from_millis(config.control.tick_interval_ms),
    );

    Ok((engine, control))
}
