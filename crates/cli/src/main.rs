//! Simulated AVR board harness CLI.
//!
//! This binary is the process lifecycle for an instrumented simulation run.
//! It performs:
//! 1. **Setup:** Load firmware, resolve the target part, wire the traced
//!    signal channels.
//! 2. **Run:** Start the trace, launch continuous simulation on a
//!    background thread, and observe for a bounded window.
//! 3. **Teardown:** Stop the trace (flushing a valid VCD artifact) and
//!    exit, leaving the advancement thread to be reaped by process exit.

use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lanternsim_core::config::Config;
use lanternsim_core::mcu::parts::SUPPORTED_PARTS;
use lanternsim_core::mcu::script::ScriptedCore;
use lanternsim_core::sim::{Firmware, Supervisor, loader};
use lanternsim_core::trace::TraceSession;

mod demo;

#[derive(Parser, Debug)]
#[command(
    name = "lantern",
    author,
    version,
    about = "Simulated AVR board harness with VCD signal tracing",
    long_about = "Load a firmware image into a simulated AVR, run it continuously on a \
background thread, and record the display-bus signals into a VCD waveform trace \
readable by GTKWave.\n\nExamples:\n  lantern run -f wordclock.elf\n  lantern run -f \
wordclock.elf --mcu atmega328p --window 10 -o strobe.vcd\n  lantern parts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a firmware image under the harness and record a waveform trace.
    Run(RunArgs),

    /// List the parts the harness can simulate.
    Parts,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// ELF firmware image to load.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Treat the image as a raw flash dump instead of ELF.
    #[arg(long, requires = "file")]
    raw: bool,

    /// JSON configuration file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Target part (e.g. atmega168).
    #[arg(long)]
    mcu: Option<String>,

    /// Clock frequency in hertz.
    #[arg(long)]
    frequency: Option<u64>,

    /// VCD output path.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Trace sampling resolution in simulated microseconds.
    #[arg(long)]
    resolution: Option<u64>,

    /// Observation window in seconds.
    #[arg(long)]
    window: Option<u64>,

    /// JSON stimulus schedule for the scripted core; defaults to the
    /// built-in display-refresh demo.
    #[arg(long)]
    stimulus: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match Cli::parse().command {
        Commands::Run(args) => cmd_run(&args),
        Commands::Parts => cmd_parts(),
    }
}

/// Reports a setup-time error and aborts before any background execution.
fn fatal(error: &dyn Error) -> ! {
    eprintln!("[!] FATAL: {error}");
    let mut source = error.source();
    while let Some(inner) = source {
        eprintln!("    caused by: {inner}");
        source = inner.source();
    }
    process::exit(1);
}

/// Runs the full lifecycle: setup, background launch, bounded observation,
/// trace teardown.
fn cmd_run(args: &RunArgs) {
    let config = merge_config(args);

    let mut firmware = match (&args.file, args.raw) {
        (Some(path), false) => loader::load_elf(path).unwrap_or_else(|e| fatal(&e)),
        (Some(path), true) => loader::load_raw(path).unwrap_or_else(|e| fatal(&e)),
        (None, _) => {
            info!("no firmware image; running the stimulus schedule only");
            Firmware::default()
        }
    };
    // AVR images don't carry their part name or clock; pin them from config.
    firmware.part.clone_from(&config.device.part);
    firmware.frequency_hz = config.device.frequency_hz;

    let core = match &args.stimulus {
        Some(path) => ScriptedCore::from_json_path(path).unwrap_or_else(|e| fatal(&e)),
        None => ScriptedCore::new(demo::display_refresh()),
    };

    let mut supervisor =
        Supervisor::initialize_with_core(&firmware, Box::new(core)).unwrap_or_else(|e| fatal(&e));

    // Tracing is best-effort observability: an unwritable output path is
    // reported and the run proceeds untraced. Channel registration errors
    // are configuration bugs and fail fast.
    let session = match TraceSession::open(
        &config.trace.output,
        config.trace.resolution_micros,
        supervisor.mcu().clock(),
    ) {
        Ok(session) => Some(session),
        Err(error) => {
            warn!(%error, "tracing disabled");
            None
        }
    };
    if let Some(session) = &session {
        for channel in &config.trace.channels {
            let id = supervisor
                .mcu()
                .signal(channel.signal)
                .unwrap_or_else(|e| fatal(&e));
            session
                .add_signal(
                    supervisor.mcu_mut(),
                    id,
                    channel.signal.width(),
                    &channel.name,
                )
                .unwrap_or_else(|e| fatal(&e));
        }
        if let Err(error) = session.start() {
            warn!(%error, "tracing disabled");
        }
    }

    let handle = supervisor.run_async().unwrap_or_else(|e| fatal(&e));

    Supervisor::await_window(Duration::from_secs(config.run.window_secs));

    if let Some(session) = &session {
        if let Err(error) = session.stop() {
            warn!(%error, "trace flush failed");
        }
    }
    info!(simulated = %handle.clock().now(), "observation window closed");
    // The advancement thread has no cancellation channel; falling off main
    // reaps it with the process.
}

/// Loads the JSON config (if any) and folds the CLI overrides into it.
fn merge_config(args: &RunArgs) -> Config {
    let mut config = match &args.config {
        Some(path) => Config::from_json_path(path).unwrap_or_else(|e| fatal(&e)),
        None => Config::default(),
    };
    if let Some(mcu) = &args.mcu {
        config.device.part.clone_from(mcu);
    }
    if let Some(frequency) = args.frequency {
        config.device.frequency_hz = frequency;
    }
    if let Some(output) = &args.output {
        config.trace.output.clone_from(output);
    }
    if let Some(resolution) = args.resolution {
        config.trace.resolution_micros = resolution;
    }
    if let Some(window) = args.window {
        config.run.window_secs = window;
    }
    config
}

/// Prints the part catalog.
fn cmd_parts() {
    println!("{:<12} {:>6} {:>6}  {:<6} SPI", "PART", "FLASH", "SRAM", "PORTS");
    for part in SUPPORTED_PARTS {
        let ports: String = part.io_ports.iter().collect();
        println!(
            "{:<12} {:>5}K {:>5}B  {:<6} {}",
            part.name,
            part.flash_bytes / 1024,
            part.sram_bytes,
            ports,
            part.spi_units
        );
    }
}
