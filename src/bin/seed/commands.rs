//! Line commands read from stdin while a patch is playing.

use seed_synth::{
    dsp::{FilterMode, Waveform},
    synth::ParamMessage,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Empty line: flip the gate line.
    ToggleGate,
    Param(ParamMessage),
    Quit,
}

pub const HELP: &str = "\
commands:
  <enter>             toggle gate (mono)
  wave <sine|saw|triangle|square>
  amp <0..1>          pw <0..1>
  cutoff <hz>         res <0..1>
  mode <lp|bp|hp|notch>
  a|d|r <seconds>     s <0..1>
  delay <samples>     fb <0..1>     mix <0..1>
  panic               q";

pub fn parse(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(Command::ToggleGate);
    };
    let arg = words.next();

    let number = || -> Result<f32, String> {
        let arg = arg.ok_or_else(|| format!("{name} needs a value"))?;
        arg.parse::<f32>()
            .map_err(|_| format!("{arg:?} is not a number"))
    };

    let message = match name {
        "q" | "quit" => return Ok(Command::Quit),
        "panic" => ParamMessage::Panic,
        "wave" => ParamMessage::SetWaveform(match arg {
            Some("sine") => Waveform::Sine,
            Some("saw") => Waveform::Saw,
            Some("triangle" | "tri") => Waveform::Triangle,
            Some("square") => Waveform::Square,
            other => return Err(format!("unknown waveform {other:?}")),
        }),
        "mode" => ParamMessage::SetFilterMode(match arg {
            Some("lp") => FilterMode::LowPass,
            Some("bp") => FilterMode::BandPass,
            Some("hp") => FilterMode::HighPass,
            Some("notch") => FilterMode::Notch,
            other => return Err(format!("unknown filter mode {other:?}")),
        }),
        "amp" => ParamMessage::SetAmplitude(number()?),
        "pw" => ParamMessage::SetPulseWidth(number()?),
        "cutoff" => ParamMessage::SetCutoff(number()?),
        "res" => ParamMessage::SetResonance(number()?),
        "a" => ParamMessage::SetAttack(number()?),
        "d" => ParamMessage::SetDecay(number()?),
        "s" => ParamMessage::SetSustain(number()?),
        "r" => ParamMessage::SetRelease(number()?),
        "delay" => ParamMessage::SetDelaySamples(number()?),
        "fb" => ParamMessage::SetFeedback(number()?),
        "mix" => ParamMessage::SetDelayMix(number()?),
        other => return Err(format!("unknown command {other:?}")),
    };

    Ok(Command::Param(message))
}
