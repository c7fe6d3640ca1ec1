//! Built-in demo stimulus.
//!
//! When no stimulus schedule is supplied, the harness replays one display
//! refresh of the lantern board's LED driver bus: a frame of bytes shifted
//! out over SPI with SCLK pulses, latched with XLAT, then blanked and
//! re-enabled with BLANK. The schedule repeats for the whole run, so the
//! trace shows a steady strobe pattern.

use lanternsim_core::mcu::io::SignalKey;
use lanternsim_core::mcu::script::{OnDrain, Stimulus, StimulusEvent};

/// Serial clock line (port B bit 5).
const SCLK: SignalKey = SignalKey::PortBit { port: 'B', bit: 5 };
/// Latch line (port B bit 1).
const XLAT: SignalKey = SignalKey::PortBit { port: 'B', bit: 1 };
/// Blank line (port B bit 2).
const BLANK: SignalKey = SignalKey::PortBit { port: 'B', bit: 2 };
/// SPI data out.
const MOSI: SignalKey = SignalKey::SpiOutput { unit: 0 };

/// Bytes shifted out per refresh.
const FRAME: &[u8] = &[0xC0, 0x3A, 0x55, 0x0F, 0xAA, 0xF0, 0x81, 0x7E];

/// One repeating display-refresh schedule.
pub fn display_refresh() -> Stimulus {
    let mut events = Vec::new();
    let mut t = 0;
    for &byte in FRAME {
        events.push(event(t, MOSI, u32::from(byte)));
        for _ in 0..8 {
            t += 1;
            events.push(event(t, SCLK, 1));
            t += 1;
            events.push(event(t, SCLK, 0));
        }
        t += 2;
    }
    // Latch the shifted frame, then pulse blank to restart the PWM cycle.
    events.push(event(t + 2, XLAT, 1));
    events.push(event(t + 4, XLAT, 0));
    events.push(event(t + 6, BLANK, 1));
    events.push(event(t + 8, BLANK, 0));
    Stimulus {
        events,
        on_drain: OnDrain::Repeat,
    }
}

const fn event(at: u64, signal: SignalKey, value: u32) -> StimulusEvent {
    StimulusEvent { at, signal, value }
}
