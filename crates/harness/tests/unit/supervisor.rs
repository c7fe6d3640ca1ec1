//! Unit tests for execution supervision.

use std::fs;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;

use lanternsim_core::SimError;
use lanternsim_core::mcu::RunState;
use lanternsim_core::mcu::io::SignalKey;
use lanternsim_core::mcu::parts::SUPPORTED_PARTS;
use lanternsim_core::mcu::script::ScriptedCore;
use lanternsim_core::sim::Supervisor;
use lanternsim_core::trace::TraceSession;

use crate::common;

#[test]
fn initialize_leaves_every_part_stopped() {
    for part in SUPPORTED_PARTS {
        let supervisor = Supervisor::initialize(&common::firmware_for(part.name)).unwrap();
        assert_eq!(supervisor.mcu().state(), RunState::Stopped);
        assert_eq!(supervisor.mcu().part().name, part.name);
    }
}

#[test]
fn unknown_part_aborts_before_any_execution() {
    let firmware = common::firmware_for("unknown-part");
    let error = Supervisor::initialize(&firmware).unwrap_err();
    assert!(matches!(error, SimError::UnknownDevice(name) if name == "unknown-part"));
}

#[test]
fn await_window_blocks_for_the_duration() {
    let started = Instant::now();
    Supervisor::await_window(Duration::from_millis(30));
    assert!(started.elapsed() >= Duration::from_millis(30));
}

#[test]
fn background_run_records_while_the_foreground_waits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("background.vcd");

    let xlat = SignalKey::PortBit { port: 'B', bit: 1 };
    let core = ScriptedCore::new(common::pulse_stimulus(xlat, &[(10, 1), (50, 0), (120, 1)]));
    let mut supervisor =
        Supervisor::initialize_with_core(&common::firmware_for("atmega168"), Box::new(core))
            .unwrap();

    let session = TraceSession::open(&path, 1, supervisor.mcu().clock()).unwrap();
    let id = supervisor.mcu().signal(xlat).unwrap();
    session
        .add_signal(supervisor.mcu_mut(), id, 1, "XLAT")
        .unwrap();
    session.start().unwrap();

    let handle = supervisor.run_async().unwrap();
    Supervisor::await_window(Duration::from_millis(100));
    session.stop().unwrap();

    // The schedule drained within the window; all three transitions are on
    // disk, stamped in simulated time, and the clock kept moving.
    let rows = common::records(&fs::read_to_string(&path).unwrap());
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].0, 10);
    assert_eq!(rows[2].0, 120);
    assert!(handle.clock().now().as_micros() >= 120);
    // No cancellation channel exists; the thread outlives the session.
    assert!(handle.is_running());
}
