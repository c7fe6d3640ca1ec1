//! Instrumented execution harness for simulated AVR-class microcontrollers.
//!
//! This crate loads a firmware image into a simulated device, runs the
//! simulation continuously on a dedicated thread, and records selected
//! hardware-signal transitions into a VCD waveform trace. It provides:
//! 1. **Device:** Part catalog, I/O signal hub, and the core-model seam a
//!    full instruction-set simulator attaches to.
//! 2. **Firmware:** ELF and raw-binary image loading.
//! 3. **Tracing:** Change-driven signal capture into a GTKWave-readable VCD.
//! 4. **Supervision:** Background advancement thread plus foreground
//!    observation-window control.
//! 5. **Configuration:** JSON-deserializable run/trace/device settings.

/// Common types (errors, simulated time, shared clock).
pub mod common;
/// Run, trace, and device configuration (defaults, JSON deserialization).
pub mod config;
/// Simulated device (part catalog, signal hub, core models).
pub mod mcu;
/// Firmware loading and execution supervision.
pub mod sim;
/// Signal trace recording (VCD writer, trace sessions).
pub mod trace;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Error taxonomy for device construction and firmware loading.
pub use crate::common::error::{FirmwareError, SimError, TraceError};
/// Simulated-time primitives shared across threads.
pub use crate::common::time::{SimClock, SimTime};
/// The simulated device; construct through [`sim::Supervisor::initialize`].
pub use crate::mcu::Mcu;
/// Firmware image descriptor; produce with [`sim::loader`].
pub use crate::sim::Firmware;
/// Lifecycle owner of the simulation instance.
pub use crate::sim::{RunHandle, Supervisor};
/// One open waveform-recording session.
pub use crate::trace::TraceSession;
