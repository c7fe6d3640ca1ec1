//! The simulated device.
//!
//! This module stands up one simulation instance per process. It provides:
//! 1. **Parts:** The declarative catalog of supported devices.
//! 2. **I/O:** The signal hub with synchronous change notification.
//! 3. **Cores:** The [`CoreModel`] seam plus the bundled idle and scripted
//!    models.
//! 4. **`Mcu`:** The instance itself — part, clock, flash, run state.

/// The execution-model seam and the bundled idle model.
pub mod core;
/// Signal selectors, handles, and the change-notification hub.
pub mod io;
/// Declarative catalog of supported parts.
pub mod parts;
/// Scripted stimulus replay through the core-model seam.
pub mod script;

use std::fmt;

use tracing::info;

use crate::common::error::SimError;
use crate::common::time::SimClock;
use crate::mcu::core::{CoreModel, DEFAULT_QUANTUM_CYCLES, IdleCore};
use crate::mcu::io::{IoHub, NotifyFn, SignalId, SignalKey};
use crate::mcu::parts::Part;
use crate::sim::Firmware;

/// Run state of a simulation instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    /// Constructed or loaded, not yet advancing.
    #[default]
    Stopped,
    /// Owned by the background advancement thread.
    Running,
}

/// One simulation instance.
///
/// Exactly one per process in this design; constructed through
/// [`crate::sim::Supervisor::initialize`], exclusively owned by the
/// supervisor, and moved (never copied) into the background thread when the
/// run starts. After that move, only the background thread mutates the
/// instance; other threads hold at most the shared [`SimClock`].
pub struct Mcu {
    part: &'static Part,
    frequency_hz: u64,
    clock: SimClock,
    io: IoHub,
    core: Box<dyn CoreModel>,
    flash: Vec<u8>,
    state: RunState,
}

impl Mcu {
    /// Constructs an instance of the named part with no execution model.
    ///
    /// Fails with [`SimError::UnknownDevice`] and no side effects when the
    /// identifier is not in the catalog. The instance starts `Stopped`.
    pub fn new(part_name: &str) -> Result<Self, SimError> {
        Self::with_core(part_name, Box::new(IdleCore))
    }

    /// Constructs an instance of the named part with an attached model.
    pub fn with_core(part_name: &str, core: Box<dyn CoreModel>) -> Result<Self, SimError> {
        let part =
            parts::lookup(part_name).ok_or_else(|| SimError::UnknownDevice(part_name.into()))?;
        Ok(Self {
            part,
            frequency_hz: part.default_frequency_hz,
            clock: SimClock::new(part.default_frequency_hz),
            io: IoHub::new(part),
            // Erased flash reads all-ones.
            flash: vec![0xFF; part.flash_bytes],
            core,
            state: RunState::Stopped,
        })
    }

    /// Loads a firmware image into flash and adopts its clock frequency.
    ///
    /// Must run before [`Self::clock`] handles are handed out: a nonzero
    /// image frequency replaces the shared clock.
    pub fn load(&mut self, firmware: &Firmware) -> Result<(), SimError> {
        if firmware.image.len() > self.part.flash_bytes {
            return Err(SimError::ImageTooLarge {
                part: self.part.name,
                image_bytes: firmware.image.len(),
                flash_bytes: self.part.flash_bytes,
            });
        }
        self.flash[..firmware.image.len()].copy_from_slice(&firmware.image);
        if firmware.frequency_hz != 0 {
            self.frequency_hz = firmware.frequency_hz;
            self.clock = SimClock::new(firmware.frequency_hz);
        }
        info!(
            part = self.part.name,
            bytes = firmware.image.len(),
            frequency_hz = self.frequency_hz,
            core = self.core.name(),
            "firmware loaded"
        );
        Ok(())
    }

    /// Returns the part descriptor.
    #[must_use]
    pub const fn part(&self) -> &'static Part {
        self.part
    }

    /// Returns the clock frequency in hertz.
    #[must_use]
    pub const fn frequency_hz(&self) -> u64 {
        self.frequency_hz
    }

    /// Returns a shared handle to the simulated clock.
    #[must_use]
    pub fn clock(&self) -> SimClock {
        self.clock.clone()
    }

    /// Returns the current run state.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// Returns the flash contents.
    #[must_use]
    pub fn flash(&self) -> &[u8] {
        &self.flash
    }

    /// Resolves a signal selector to a handle on this instance.
    pub fn signal(&self, key: SignalKey) -> Result<SignalId, SimError> {
        self.io.lookup(key).ok_or(SimError::UnknownSignal {
            part: self.part.name,
            key,
        })
    }

    /// Subscribes a listener to value changes on `id`.
    ///
    /// The listener runs synchronously on whatever thread advances the
    /// instance, so it must be `Send` and must not block.
    pub fn subscribe(&mut self, id: SignalId, listener: NotifyFn) {
        self.io.subscribe(id, listener);
    }

    /// Advances the instance by one scheduling quantum.
    ///
    /// Delegates to the attached core; if the core leaves the clock where it
    /// was, the instance consumes an idle quantum instead, so simulated time
    /// always moves forward.
    pub fn advance(&mut self) {
        let before = self.clock.cycle_count();
        self.core.step(&self.clock, &mut self.io);
        if self.clock.cycle_count() == before {
            self.clock.advance(DEFAULT_QUANTUM_CYCLES);
        }
    }

    pub(crate) fn mark_running(&mut self) {
        self.state = RunState::Running;
    }
}

impl fmt::Debug for Mcu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mcu")
            .field("part", &self.part.name)
            .field("frequency_hz", &self.frequency_hz)
            .field("state", &self.state)
            .field("core", &self.core.name())
            .finish_non_exhaustive()
    }
}
