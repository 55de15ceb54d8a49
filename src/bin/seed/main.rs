//! seed - play one of the stock patches on the default audio device
//!
//! Run with: cargo run -- mono
//!
//! While playing, type commands on stdin (see `commands.rs`); an empty line
//! toggles the gate in gate mode, `q` quits.

mod app;
mod commands;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use seed_synth::EngineConfig;

#[derive(Parser)]
#[command(name = "seed")]
#[command(about = "Realtime monophonic synth patches")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    patch: Patch,

    /// Load the full engine configuration from a TOML file instead of the preset
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the render block size
    #[arg(long, global = true)]
    block_size: Option<usize>,
}

#[derive(Subcommand, Clone, Copy)]
enum Patch {
    /// 440 Hz sine
    Sine,
    /// Saw through a resonant lowpass, gated from stdin
    Mono,
    /// Triangle step sequencer
    Sequencer,
    /// Feedback delay on the default input device
    Delay,
}

impl Patch {
    fn preset(self, sample_rate: f32) -> EngineConfig {
        match self {
            Patch::Sine => EngineConfig::sine_wave(sample_rate),
            Patch::Mono => EngineConfig::mono_synth(sample_rate),
            Patch::Sequencer => EngineConfig::sequencer(sample_rate),
            Patch::Delay => EngineConfig::feedback_delay(sample_rate),
        }
    }
}

fn load_config(path: &Path) -> EyreResult<EngineConfig> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&text).wrap_err_with(|| format!("failed to parse {}", path.display()))
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let file_config = cli.config.as_deref().map(load_config).transpose()?;
    let patch = cli.patch;

    app::run(
        move |sample_rate| file_config.unwrap_or_else(|| patch.preset(sample_rate)),
        cli.block_size,
    )
}
