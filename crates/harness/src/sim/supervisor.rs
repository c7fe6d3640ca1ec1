//! Execution supervision.
//!
//! The supervisor owns the simulation instance for its whole lifetime: it
//! stands the instance up from a firmware image, hands out setup-time access
//! for signal wiring, then moves the instance onto a background thread that
//! advances it for the rest of the process. The foreground thread keeps only
//! the shared clock and the trace session; it observes for a bounded window
//! and tears tracing down.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::info;

use crate::common::error::SimError;
use crate::common::time::SimClock;
use crate::mcu::Mcu;
use crate::mcu::core::CoreModel;
use crate::sim::Firmware;

/// Owns the simulation instance from construction to launch.
#[derive(Debug)]
pub struct Supervisor {
    mcu: Mcu,
}

impl Supervisor {
    /// Stands up a simulation instance from a firmware image.
    ///
    /// Resolves `firmware.part` against the catalog, loads the image, and
    /// leaves the instance `Stopped`. An unknown identifier fails with
    /// [`SimError::UnknownDevice`] before any thread spawns or file opens.
    pub fn initialize(firmware: &Firmware) -> Result<Self, SimError> {
        let mut mcu = Mcu::new(&firmware.part)?;
        mcu.load(firmware)?;
        Ok(Self { mcu })
    }

    /// Like [`Self::initialize`], with an attached execution model.
    pub fn initialize_with_core(
        firmware: &Firmware,
        core: Box<dyn CoreModel>,
    ) -> Result<Self, SimError> {
        let mut mcu = Mcu::with_core(&firmware.part, core)?;
        mcu.load(firmware)?;
        Ok(Self { mcu })
    }

    /// Setup-time access to the instance (signal resolution).
    #[must_use]
    pub const fn mcu(&self) -> &Mcu {
        &self.mcu
    }

    /// Setup-time mutable access to the instance (signal subscription).
    pub const fn mcu_mut(&mut self) -> &mut Mcu {
        &mut self.mcu
    }

    /// Launches continuous advancement on a background thread.
    ///
    /// Does not block. The spawned loop advances the instance one scheduling
    /// quantum at a time and never returns: there is no cancellation channel
    /// by design, and the thread is fire-and-forget, reaped by process exit.
    /// Consumes the supervisor; from here on the background thread is the
    /// sole owner of the instance.
    pub fn run_async(self) -> io::Result<RunHandle> {
        let mut mcu = self.mcu;
        mcu.mark_running();
        let clock = mcu.clock();
        info!(part = mcu.part().name, "launching simulation thread");
        let thread = thread::Builder::new()
            .name("mcu-run".into())
            .spawn(move || {
                loop {
                    mcu.advance();
                }
            })?;
        Ok(RunHandle { clock, thread })
    }

    /// Suspends the calling thread for the observation window.
    pub fn await_window(window: Duration) {
        info!(?window, "observing");
        thread::sleep(window);
    }
}

/// Handle left behind after launch: the shared clock and the (never-joined)
/// advancement thread.
#[derive(Debug)]
pub struct RunHandle {
    clock: SimClock,
    thread: JoinHandle<()>,
}

impl RunHandle {
    /// Shared simulated clock of the running instance.
    #[must_use]
    pub const fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Whether the advancement thread is still alive. Under normal operation
    /// this stays `true` until process exit.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.thread.is_finished()
    }
}
