//! Entry point for the **acpi-volumed** daemon.
//!
//! Opens the mixer, connects to acpid, runs the
//! [`EventSource`](acpi_volumed::traits::EventSource) on a background
//! thread and applies incoming actions on the main thread.  The process
//! exits with status 1 on the first mixer error or when acpid goes away.

use acpi_volumed::backend::acpid::{AcpidError, AcpidSource};
use acpi_volumed::backend::mixer::{AlsaMixer, AlsaMixerError};
use acpi_volumed::config::{config_dir, Config, ConfigError, Overrides};
use acpi_volumed::daemon::{DaemonError, VolumeDaemon};
use acpi_volumed::event::Action;
use acpi_volumed::traits::EventSource;
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::sync::mpsc;

/// Adjust ALSA volume and mute from acpid hotkey events.
#[derive(Parser)]
#[command(name = "acpi-volumed", version, about, long_about = None)]
struct Cli {
    /// Playback simple control to drive (default: Master).
    #[arg(short = 'd', long)]
    playback: Option<String>,

    /// Capture simple control toggled by the mic-mute key (default: Capture).
    #[arg(short, long)]
    capture: Option<String>,

    /// Raw volume units per key press (default: 1).
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    step: Option<u32>,

    /// ALSA card to open (default: "default").
    #[arg(long)]
    card: Option<String>,

    /// acpid event socket (default: /var/run/acpid.socket).
    #[arg(long)]
    socket: Option<PathBuf>,

    /// JSON config file (default: $XDG_CONFIG_HOME/acpi-volumed/config.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Mixer(#[from] AlsaMixerError),
    #[error(transparent)]
    Acpid(#[from] AcpidError),
    #[error(transparent)]
    Daemon(#[from] DaemonError),
    #[error("event source thread panicked")]
    SourcePanicked,
}

//  Main

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let default_path = config_dir().join("config.json");
    let mut config = Config::resolve(cli.config.as_deref(), &default_path)?;
    config.apply_overrides(Overrides {
        socket: cli.socket,
        card: cli.card,
        playback: cli.playback,
        capture: cli.capture,
        step: cli.step,
    });
    config.validate()?;

    let mixer = AlsaMixer::open(
        &config.mixer.card,
        &config.mixer.playback,
        &config.mixer.capture,
    )?;
    let mut source = AcpidSource::connect(&config.socket, config.keymap.clone())?;
    info!("listening for events on {}", source.path().display());
    let mut daemon = VolumeDaemon::new(mixer, config.mixer.step);

    let (tx, rx) = mpsc::channel::<Action>();
    let reader = std::thread::spawn(move || source.run(tx));

    info!(
        "acpi-volumed running on card {} (step {})",
        daemon.mixer().card(),
        daemon.step()
    );
    daemon.run(rx)?;

    // The channel only closes once the reader thread has returned.
    match reader.join() {
        Ok(result) => result.map_err(Error::from),
        Err(_) => Err(Error::SourcePanicked),
    }
}

//  Helpers

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
