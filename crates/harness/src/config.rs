//! Configuration for a harness run.
//!
//! This module defines the configuration structures consumed by the CLI and
//! tests. It provides:
//! 1. **Defaults:** The lantern board's bring-up values (part, clock, trace
//!    output, observation window, traced channels).
//! 2. **Structures:** Hierarchical config for device, trace, and run
//!    settings, deserializable from JSON.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::mcu::io::SignalKey;

/// Default configuration constants.
///
/// These mirror the lantern board bring-up: an ATmega168 on a 16 MHz
/// crystal, four traced display-bus channels, and a one-minute observation
/// window.
mod defaults {
    /// Target part when the firmware image does not name one.
    pub const PART: &str = "atmega168";

    /// Board crystal frequency in hertz.
    pub const FREQUENCY_HZ: u64 = 16_000_000;

    /// Waveform trace output path.
    pub const TRACE_OUTPUT: &str = "lantern.vcd";

    /// Trace sampling resolution in simulated microseconds.
    pub const RESOLUTION_MICROS: u64 = 100;

    /// Foreground observation window in seconds.
    pub const WINDOW_SECS: u64 = 60;
}

/// Root configuration; use `Config::default()` or deserialize from JSON.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target device settings.
    pub device: DeviceConfig,
    /// Waveform trace settings.
    pub trace: TraceConfig,
    /// Run lifecycle settings.
    pub run: RunConfig,
}

/// Target device settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Device identifier pinned onto the firmware image.
    pub part: String,
    /// Clock frequency pinned onto the firmware image, in hertz.
    pub frequency_hz: u64,
}

/// Waveform trace settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Output path for the VCD artifact.
    pub output: PathBuf,
    /// Sampling resolution in simulated microseconds.
    pub resolution_micros: u64,
    /// Channels to register, in header order.
    pub channels: Vec<ChannelConfig>,
}

/// Run lifecycle settings.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Foreground observation window in seconds.
    pub window_secs: u64,
}

/// One traced channel: a display name bound to a signal selector.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Display name in the trace header; unique within a session.
    pub name: String,
    /// The signal to record.
    pub signal: SignalKey,
}

/// Errors raised while loading configuration from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read config `{path}`")]
    Read {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid JSON for [`Config`].
    #[error("malformed config")]
    Parse(#[from] serde_json::Error),
}

impl Config {
    /// Loads configuration from a JSON file.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            part: defaults::PART.to_owned(),
            frequency_hz: defaults::FREQUENCY_HZ,
        }
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(defaults::TRACE_OUTPUT),
            resolution_micros: defaults::RESOLUTION_MICROS,
            channels: default_channels(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            window_secs: defaults::WINDOW_SECS,
        }
    }
}

/// The lantern board's display bus: SPI data plus the three TLC strobe
/// lines on port B.
#[must_use]
pub fn default_channels() -> Vec<ChannelConfig> {
    vec![
        ChannelConfig {
            name: "MOSI".to_owned(),
            signal: SignalKey::SpiOutput { unit: 0 },
        },
        ChannelConfig {
            name: "XLAT".to_owned(),
            signal: SignalKey::PortBit { port: 'B', bit: 1 },
        },
        ChannelConfig {
            name: "BLANK".to_owned(),
            signal: SignalKey::PortBit { port: 'B', bit: 2 },
        },
        ChannelConfig {
            name: "SCLK".to_owned(),
            signal: SignalKey::PortBit { port: 'B', bit: 5 },
        },
    ]
}
