//! Error taxonomy for the harness.
//!
//! Setup-time errors (`SimError`, `FirmwareError`) are unrecoverable and are
//! reported before any background execution begins. Tracing errors
//! (`TraceError`) are isolated: a tracing failure never prevents or corrupts
//! the simulation itself.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::mcu::io::SignalKey;

/// Fatal errors raised while standing up a simulation instance.
#[derive(Debug, Error)]
pub enum SimError {
    /// The requested part is not in the catalog of simulated devices.
    #[error("unknown device `{0}`")]
    UnknownDevice(String),

    /// The firmware image could not be read or parsed.
    #[error(transparent)]
    Firmware(#[from] FirmwareError),

    /// The firmware image does not fit in the part's flash.
    #[error("firmware image ({image_bytes} bytes) exceeds {part} flash ({flash_bytes} bytes)")]
    ImageTooLarge {
        /// Catalog name of the target part.
        part: &'static str,
        /// Size of the loaded image in bytes.
        image_bytes: usize,
        /// Flash capacity of the part in bytes.
        flash_bytes: usize,
    },

    /// The requested signal does not exist on the target part.
    #[error("no signal {key} on {part}")]
    UnknownSignal {
        /// Catalog name of the target part.
        part: &'static str,
        /// The selector that failed to resolve.
        key: SignalKey,
    },
}

/// Errors raised by the firmware loader.
#[derive(Debug, Error)]
pub enum FirmwareError {
    /// The image file could not be read from disk.
    #[error("could not read firmware `{path}`")]
    Read {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The image is not a well-formed ELF object.
    #[error("malformed firmware image")]
    Parse(#[from] object::read::Error),

    /// A program header points outside the file.
    #[error("firmware segment data out of bounds")]
    Truncated,

    /// The image declares no loadable segments.
    #[error("firmware contains no loadable segments")]
    NoLoadableSegments,
}

/// Errors raised by the signal trace recorder.
///
/// None of these abort the simulation; callers report them and continue
/// untraced.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The waveform output file could not be created.
    #[error("could not open trace output `{path}`")]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Writing or flushing the trace artifact failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A channel with this display name is already registered.
    #[error("trace channel `{0}` is already registered")]
    DuplicateChannel(String),

    /// Channel registration was attempted after the session started.
    #[error("trace channels must be registered before the session starts")]
    AlreadyStarted,

    /// The session was disabled after an earlier write failure.
    #[error("trace session disabled after a write failure")]
    Disabled,
}
