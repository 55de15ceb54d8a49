//! Device setup and the two running domains.

use std::{
    io::BufRead,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{error, info, warn};

use seed_synth::{
    config::{ControlMode, SignalSource},
    engine::{
        self,
        control::{GateInput, SystemClock},
    },
    synth::{param_channel, ParamMessage},
    EngineConfig, MAX_BLOCK_SIZE,
};

use crate::commands::{self, Command};

pub fn run(
    make_config: impl FnOnce(f32) -> EngineConfig,
    block_size: Option<usize>,
) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let supported = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = supported.sample_rate().0 as f32;
    let channels = check_channels(supported.channels(), "output")?;

    let mut config = make_config(sample_rate);
    if config.sample_rate != sample_rate {
        warn!(
            configured = config.sample_rate,
            device = sample_rate,
            "using the device sample rate"
        );
        config.sample_rate = sample_rate;
    }
    if let Some(size) = block_size {
        config.block_size = size;
    }

    info!(sample_rate, channels, block_size = config.block_size, "output device ready");

    let gate_line = Arc::new(AtomicBool::new(false));
    let gate_input: Option<Box<dyn GateInput + Send>> = match config.control.mode {
        ControlMode::Gate => Some(Box::new(Arc::clone(&gate_line))),
        _ => None,
    };

    let (mut render, mut control) = engine::build(&config, SystemClock::new(), gate_input)
        .wrap_err("invalid engine configuration")?;
    let (param_tx, mut param_rx) = param_channel();

    // Input audio reaches the output callback through a ring that is trimmed
    // to one callback's worth before each read.
    let (input_tx, mut input_rx) = RingBuffer::<f32>::new(sample_rate as usize);
    let _input_stream = match config.source {
        SignalSource::Input => Some(open_input(&host, input_tx, sample_rate as u32)?),
        SignalSource::Voice => None,
    };

    let mut dry = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &supported.into(),
        move |data: &mut [f32], _| {
            render.drain(&mut param_rx);
            trim_backlog(&mut input_rx, data.len() / channels);

            for chunk in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                let frames = chunk.len() / channels;
                fill_from(&mut input_rx, &mut dry[..frames]);
                render.render_interleaved(&dry[..frames], 1, chunk, channels);
            }
        },
        |err| error!("output stream error: {err}"),
        None,
    )?;
    stream.play()?;

    let running = Arc::new(AtomicBool::new(true));
    spawn_stdin_reader(Arc::clone(&running), gate_line, param_tx);

    println!("{}", commands::HELP);
    control.run(&running);

    Ok(())
}

fn check_channels(channels: u16, direction: &str) -> EyreResult<usize> {
    match channels {
        0 => Err(eyre!("{direction} device reports no channels")),
        n => Ok(n as usize),
    }
}

/// Drop the oldest queued input so at most `keep` samples remain.
fn trim_backlog(rx: &mut Consumer<f32>, keep: usize) {
    let excess = rx.slots().saturating_sub(keep);
    if let Ok(chunk) = rx.read_chunk(excess) {
        chunk.commit_all();
    }
}

fn fill_from(rx: &mut Consumer<f32>, buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = rx.pop().unwrap_or(0.0);
    }
}

fn open_input(
    host: &cpal::Host,
    mut tx: Producer<f32>,
    output_rate: u32,
) -> EyreResult<cpal::Stream> {
    let device = host
        .default_input_device()
        .ok_or_else(|| eyre!("no default input device available"))?;
    let supported = device
        .default_input_config()
        .wrap_err("failed to fetch default input config")?;
    let channels = check_channels(supported.channels(), "input")?;
    let sample_rate = supported.sample_rate().0;
    if sample_rate != output_rate {
        warn!(
            input = sample_rate,
            output = output_rate,
            "input and output sample rates differ, input will play at the wrong speed"
        );
    }

    info!(sample_rate, channels, "input device ready");

    let stream = device.build_input_stream(
        &supported.into(),
        move |data: &[f32], _| {
            // channel 0 only; drop what the output side has not consumed
            for frame in data.chunks(channels) {
                let _ = tx.push(frame[0]);
            }
        },
        |err| error!("input stream error: {err}"),
        None,
    )?;
    stream.play()?;

    Ok(stream)
}

fn spawn_stdin_reader(
    running: Arc<AtomicBool>,
    gate_line: Arc<AtomicBool>,
    mut param_tx: Producer<ParamMessage>,
) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };

            match commands::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(Command::ToggleGate) => {
                    let open = !gate_line.load(Ordering::Acquire);
                    gate_line.store(open, Ordering::Release);
                    println!("gate {}", if open { "on" } else { "off" });
                }
                Ok(Command::Param(message)) => {
                    if param_tx.push(message).is_err() {
                        warn!("parameter queue full, dropped {message:?}");
                    }
                }
                Err(reason) => println!("{reason}\n{}", commands::HELP),
            }
        }
        running.store(false, Ordering::Release);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_channel_device_is_an_error() {
        assert!(check_channels(0, "output").is_err());
        assert_eq!(check_channels(2, "input").unwrap(), 2);
    }

    #[test]
    fn backlog_keeps_only_the_newest_samples() {
        let (mut tx, mut rx) = RingBuffer::<f32>::new(16);
        for i in 0..10 {
            tx.push(i as f32).unwrap();
        }

        trim_backlog(&mut rx, 4);
        let mut buffer = [0.0; 4];
        fill_from(&mut rx, &mut buffer);
        assert_eq!(buffer, [6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn short_backlog_is_left_alone() {
        let (mut tx, mut rx) = RingBuffer::<f32>::new(16);
        tx.push(0.5).unwrap();

        trim_backlog(&mut rx, 4);
        let mut buffer = [1.0; 3];
        fill_from(&mut rx, &mut buffer);
        assert_eq!(buffer, [0.5, 0.0, 0.0]);
    }
}
