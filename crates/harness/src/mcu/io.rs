//! I/O signal hub.
//!
//! Observable hardware signals (port pins, the SPI output line) live in a
//! flat table built from the part descriptor at construction time. The hub
//! is the device's change-notification mechanism: a write that changes a
//! signal's value synchronously invokes every listener subscribed to it, in
//! subscription order, on the thread performing the write. Writes that leave
//! the value unchanged notify nobody.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mcu::parts::Part;

/// Selector for one observable signal: peripheral class plus sub-index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKey {
    /// One bit of an I/O port, e.g. port B bit 1.
    PortBit {
        /// Port letter, as printed on the pinout.
        port: char,
        /// Bit index within the port, 0..=7.
        bit: u8,
    },
    /// The serial output line of an SPI unit (one byte per transfer).
    SpiOutput {
        /// SPI unit index.
        unit: u8,
    },
}

impl SignalKey {
    /// Bit width of the signal's value.
    #[must_use]
    pub const fn width(self) -> u8 {
        match self {
            Self::PortBit { .. } => 1,
            Self::SpiOutput { .. } => 8,
        }
    }

    /// Mask covering the signal's value bits.
    const fn mask(self) -> u32 {
        (1u32 << self.width()) - 1
    }
}

impl fmt::Display for SignalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PortBit { port, bit } => write!(f, "P{port}{bit}"),
            Self::SpiOutput { unit } => write!(f, "SPI{unit} output"),
        }
    }
}

/// Handle to one signal on a device instance.
///
/// Resolved once at setup via [`IoHub::lookup`] and valid for the instance's
/// lifetime. Does not own any device state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SignalId(pub(crate) u32);

/// Callback invoked with the new value whenever a signal changes.
pub type NotifyFn = Box<dyn FnMut(u32) + Send>;

struct Slot {
    key: SignalKey,
    value: u32,
    listeners: Vec<NotifyFn>,
}

/// Signal table and change-notification fan-out for one device instance.
pub struct IoHub {
    slots: Vec<Slot>,
    index: HashMap<SignalKey, SignalId>,
}

impl IoHub {
    /// Builds the signal table for a part: every bit of every I/O port plus
    /// one output line per SPI unit.
    pub(crate) fn new(part: &Part) -> Self {
        let mut hub = Self {
            slots: Vec::new(),
            index: HashMap::new(),
        };
        for &port in part.io_ports {
            for bit in 0..8 {
                hub.insert(SignalKey::PortBit { port, bit });
            }
        }
        for unit in 0..part.spi_units {
            hub.insert(SignalKey::SpiOutput { unit });
        }
        hub
    }

    fn insert(&mut self, key: SignalKey) {
        let id = SignalId(self.slots.len() as u32);
        self.slots.push(Slot {
            key,
            value: 0,
            listeners: Vec::new(),
        });
        let _ = self.index.insert(key, id);
    }

    /// Resolves a selector to a handle, if the signal exists on this part.
    #[must_use]
    pub fn lookup(&self, key: SignalKey) -> Option<SignalId> {
        self.index.get(&key).copied()
    }

    /// Returns the selector a handle was resolved from.
    #[must_use]
    pub fn key(&self, id: SignalId) -> SignalKey {
        self.slots[id.0 as usize].key
    }

    /// Returns the signal's current value.
    #[must_use]
    pub fn value(&self, id: SignalId) -> u32 {
        self.slots[id.0 as usize].value
    }

    /// Subscribes `listener` to value changes on `id`.
    pub fn subscribe(&mut self, id: SignalId, listener: NotifyFn) {
        self.slots[id.0 as usize].listeners.push(listener);
    }

    /// Drives a signal to `value`, masked to the signal's width.
    ///
    /// Listeners run synchronously, in subscription order, only when the
    /// masked value differs from the current one.
    pub fn raise(&mut self, id: SignalId, value: u32) {
        let slot = &mut self.slots[id.0 as usize];
        let value = value & slot.key.mask();
        if slot.value == value {
            return;
        }
        slot.value = value;
        for listener in &mut slot.listeners {
            listener(value);
        }
    }

    /// Number of signals on this instance.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the instance exposes no signals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for IoHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoHub")
            .field("signals", &self.slots.len())
            .finish_non_exhaustive()
    }
}
