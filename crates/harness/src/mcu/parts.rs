//! Catalog of simulated parts.
//!
//! Each entry is purely declarative: memory sizes, I/O port letters, and SPI
//! unit count. The catalog is the authority for which device identifiers
//! [`crate::mcu::Mcu::new`] accepts and which signals exist on an instance.

/// Factory-default clock of the megaAVR family's internal RC oscillator.
pub const DEFAULT_RC_FREQUENCY_HZ: u64 = 8_000_000;

/// Static description of one supported part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Part {
    /// Catalog name, matching the identifier carried by firmware images
    /// (e.g. `"atmega168"`).
    pub name: &'static str,
    /// Flash capacity in bytes.
    pub flash_bytes: usize,
    /// SRAM capacity in bytes.
    pub sram_bytes: usize,
    /// I/O port letters present on the part.
    pub io_ports: &'static [char],
    /// Number of SPI units.
    pub spi_units: u8,
    /// Clock frequency assumed when the firmware image does not carry one.
    pub default_frequency_hz: u64,
}

/// All parts the harness can stand up.
pub const SUPPORTED_PARTS: &[Part] = &[
    Part {
        name: "atmega48",
        flash_bytes: 4 * 1024,
        sram_bytes: 512,
        io_ports: &['B', 'C', 'D'],
        spi_units: 1,
        default_frequency_hz: DEFAULT_RC_FREQUENCY_HZ,
    },
    Part {
        name: "atmega88",
        flash_bytes: 8 * 1024,
        sram_bytes: 1024,
        io_ports: &['B', 'C', 'D'],
        spi_units: 1,
        default_frequency_hz: DEFAULT_RC_FREQUENCY_HZ,
    },
    Part {
        name: "atmega168",
        flash_bytes: 16 * 1024,
        sram_bytes: 1024,
        io_ports: &['B', 'C', 'D'],
        spi_units: 1,
        default_frequency_hz: DEFAULT_RC_FREQUENCY_HZ,
    },
    Part {
        name: "atmega328p",
        flash_bytes: 32 * 1024,
        sram_bytes: 2048,
        io_ports: &['B', 'C', 'D'],
        spi_units: 1,
        default_frequency_hz: DEFAULT_RC_FREQUENCY_HZ,
    },
];

/// Resolves a device identifier against the catalog.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static Part> {
    SUPPORTED_PARTS.iter().find(|part| part.name == name)
}
