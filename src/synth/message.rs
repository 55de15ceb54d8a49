#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

use crate::dsp::{FilterMode, Waveform};

/// Control-rate parameter changes for the render engine.
///
/// Values are applied at the next block boundary and clamped to safe ranges
/// there; none of these can fail once audio is running.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ParamMessage {
    SetWaveform(Waveform),
    SetAmplitude(f32),
    SetPulseWidth(f32),
    SetCutoff(f32),
    SetResonance(f32),
    SetFilterMode(FilterMode),
    SetAttack(f32),
    SetDecay(f32),
    SetSustain(f32),
    SetRelease(f32),
    SetDelaySamples(f32),
    SetFeedback(f32),
    SetDelayMix(f32),
    /// Drop the note and clear the delay buffer.
    Panic,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<ParamMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<ParamMessage> {
    fn pop(&mut self) -> Option<ParamMessage> {
        Consumer::pop(self).ok()
    }
}

/// A receiver with nothing in it, for engines driven only by the gate mailbox.
pub struct NoMessages;

impl MessageReceiver for NoMessages {
    fn pop(&mut self) -> Option<ParamMessage> {
        None
    }
}

pub const PARAM_QUEUE_SIZE: usize = 64;

#[cfg(feature = "rtrb")]
pub fn param_channel() -> (Producer<ParamMessage>, Consumer<ParamMessage>) {
    RingBuffer::<ParamMessage>::new(PARAM_QUEUE_SIZE)
}
