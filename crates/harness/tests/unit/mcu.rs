//! Unit tests for device construction, signal lookup, and change
//! notification.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use rstest::rstest;

use lanternsim_core::Mcu;
use lanternsim_core::SimError;
use lanternsim_core::mcu::RunState;
use lanternsim_core::mcu::io::SignalKey;
use lanternsim_core::mcu::parts::SUPPORTED_PARTS;
use lanternsim_core::mcu::script::ScriptedCore;

use crate::common;

#[rstest]
#[case("atmega48")]
#[case("atmega88")]
#[case("atmega168")]
#[case("atmega328p")]
fn catalog_parts_construct_stopped(#[case] part: &str) {
    let mcu = Mcu::new(part).unwrap();
    assert_eq!(mcu.state(), RunState::Stopped);
    assert_eq!(mcu.part().name, part);
    assert_eq!(mcu.flash().len(), mcu.part().flash_bytes);
}

#[test]
fn every_catalog_entry_constructs() {
    for part in SUPPORTED_PARTS {
        assert!(Mcu::new(part.name).is_ok(), "part {}", part.name);
    }
}

#[test]
fn unknown_device_is_rejected() {
    let error = Mcu::new("unknown-part").unwrap_err();
    assert!(matches!(error, SimError::UnknownDevice(name) if name == "unknown-part"));
}

#[test]
fn signals_resolve_on_catalog_ports() {
    let mcu = Mcu::new("atmega168").unwrap();
    for port in ['B', 'C', 'D'] {
        for bit in 0..8 {
            assert!(mcu.signal(SignalKey::PortBit { port, bit }).is_ok());
        }
    }
    assert!(mcu.signal(SignalKey::SpiOutput { unit: 0 }).is_ok());
}

#[test]
fn missing_signals_are_rejected() {
    let mcu = Mcu::new("atmega168").unwrap();
    let error = mcu
        .signal(SignalKey::PortBit { port: 'Z', bit: 0 })
        .unwrap_err();
    assert!(matches!(error, SimError::UnknownSignal { part, .. } if part == "atmega168"));
    assert!(mcu.signal(SignalKey::SpiOutput { unit: 3 }).is_err());
}

#[test]
fn load_copies_image_and_adopts_frequency() {
    let firmware = common::firmware_for("atmega168");
    let mut mcu = Mcu::new("atmega168").unwrap();
    mcu.load(&firmware).unwrap();
    assert_eq!(mcu.frequency_hz(), common::TEST_FREQUENCY_HZ);
    assert_eq!(mcu.clock().frequency_hz(), common::TEST_FREQUENCY_HZ);
    assert_eq!(&mcu.flash()[..firmware.image.len()], &firmware.image[..]);
    // Beyond the image, flash reads erased.
    assert!(mcu.flash()[firmware.image.len()..].iter().all(|&b| b == 0xFF));
}

#[test]
fn oversized_image_is_rejected() {
    let mut firmware = common::firmware_for("atmega48");
    firmware.image = vec![0; 4 * 1024 + 1];
    let mut mcu = Mcu::new("atmega48").unwrap();
    let error = mcu.load(&firmware).unwrap_err();
    assert!(matches!(error, SimError::ImageTooLarge { part, .. } if part == "atmega48"));
}

#[test]
fn listeners_fire_once_per_change() {
    let xlat = SignalKey::PortBit { port: 'B', bit: 1 };
    // Duplicate values in the schedule must not produce duplicate
    // notifications.
    let core = ScriptedCore::new(common::pulse_stimulus(
        xlat,
        &[(10, 1), (20, 1), (30, 0), (40, 1)],
    ));
    let mut mcu = Mcu::with_core("atmega168", Box::new(core)).unwrap();
    mcu.load(&common::firmware_for("atmega168")).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let id = mcu.signal(xlat).unwrap();
    mcu.subscribe(id, Box::new(move |value| sink.lock().unwrap().push(value)));

    common::drive(&mut mcu, 4);
    assert_eq!(*seen.lock().unwrap(), vec![1, 0, 1]);
}

#[test]
fn spi_values_are_masked_to_width() {
    let mosi = SignalKey::SpiOutput { unit: 0 };
    let core = ScriptedCore::new(common::pulse_stimulus(mosi, &[(5, 0x1FF)]));
    let mut mcu = Mcu::with_core("atmega168", Box::new(core)).unwrap();
    mcu.load(&common::firmware_for("atmega168")).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let id = mcu.signal(mosi).unwrap();
    mcu.subscribe(id, Box::new(move |value| sink.lock().unwrap().push(value)));

    common::drive(&mut mcu, 1);
    assert_eq!(*seen.lock().unwrap(), vec![0xFF]);
}

#[test]
fn advance_always_moves_time() {
    // The default core is idle; time must still advance.
    let mut mcu = Mcu::new("atmega168").unwrap();
    let clock = mcu.clock();
    common::drive(&mut mcu, 3);
    assert!(clock.cycle_count() > 0);
}
