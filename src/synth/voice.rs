use crate::{
    config::VoiceConfig,
    dsp::{Envelope, FilterMode, Oscillator, SVFilter},
    synth::{gate::GateSnapshot, message::ParamMessage},
};

/*
Voice Signal Flow
=================

    Oscillator ──► × Envelope ──► SVFilter ──► out
        ▲               ▲
     pitch            gate
        └── GateSnapshot ┘

One snapshot is applied per render call, so pitch and gate change only at
block boundaries. A `triggered` snapshot restarts the attack from the
current level instead of snapping back to zero, and holds the gate open for
that block even if the release was published before the block started.
*/

pub struct Voice {
    oscillator: Oscillator,
    envelope: Envelope,
    filter: SVFilter,
    mode: FilterMode,
    gate: bool,
}

impl Voice {
    pub fn new(sample_rate: f32, config: &VoiceConfig) -> Self {
        let osc = &config.oscillator;
        let mut oscillator =
            Oscillator::new(sample_rate, osc.waveform, osc.frequency_hz, osc.amplitude);
        oscillator.set_pulse_width(osc.pulse_width);

        let env = &config.envelope;
        let envelope = Envelope::adsr(
            sample_rate,
            env.attack_s,
            env.decay_s,
            env.sustain_level,
            env.release_s,
        );

        let filter = SVFilter::new(sample_rate, config.filter.cutoff_hz, config.filter.resonance);

        Self {
            oscillator,
            envelope,
            filter,
            mode: config.filter.mode,
            gate: false,
        }
    }

    /// Render one block with pitch and gate taken from `snapshot`.
    pub fn render(&mut self, out: &mut [f32], snapshot: GateSnapshot) {
        if snapshot.triggered {
            self.envelope.retrigger();
        }
        // a note shorter than one block still gets this whole block
        self.gate = snapshot.gate || snapshot.triggered;
        self.oscillator.set_frequency(snapshot.frequency_hz);

        for sample in out.iter_mut() {
            let shaped = self.oscillator.process() * self.envelope.process(self.gate);
            *sample = self.filter.process(shaped).select(self.mode);
        }
    }

    /// Apply a voice parameter change. Returns false for messages that
    /// belong to another stage of the engine.
    pub fn apply(&mut self, message: ParamMessage) -> bool {
        match message {
            ParamMessage::SetWaveform(waveform) => self.oscillator.set_waveform(waveform),
            ParamMessage::SetAmplitude(amplitude) => self.oscillator.set_amplitude(amplitude),
            ParamMessage::SetPulseWidth(width) => self.oscillator.set_pulse_width(width),
            ParamMessage::SetCutoff(cutoff) => self.filter.set_cutoff(cutoff),
            ParamMessage::SetResonance(resonance) => self.filter.set_resonance(resonance),
            ParamMessage::SetFilterMode(mode) => self.mode = mode,
            ParamMessage::SetAttack(seconds) => self.envelope.set_attack(seconds),
            ParamMessage::SetDecay(seconds) => self.envelope.set_decay(seconds),
            ParamMessage::SetSustain(level) => self.envelope.set_sustain(level),
            ParamMessage::SetRelease(seconds) => self.envelope.set_release(seconds),
            ParamMessage::Panic => self.reset(),
            ParamMessage::SetDelaySamples(_)
            | ParamMessage::SetFeedback(_)
            | ParamMessage::SetDelayMix(_) => return false,
        }
        true
    }

    /// Silence immediately: envelope to idle, filter state cleared.
    pub fn reset(&mut self) {
        self.envelope.reset();
        self.filter.reset();
        self.oscillator.reset_phase();
        self.gate = false;
    }

    pub fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    pub fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn filter(&self) -> &SVFilter {
        &self.filter
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.mode
    }
}
