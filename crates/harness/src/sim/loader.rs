//! Firmware image loading.
//!
//! Firmware arrives as an ELF object (the usual avr-gcc output) or as a raw
//! flash dump. Loading flattens the loadable segments into a single flash
//! image addressed from zero, using each segment's physical (load-memory)
//! address, so initialized-data segments land in flash where the startup
//! code expects to copy them from.
//!
//! Images rarely carry the target part name or clock frequency; callers pin
//! those on the returned [`Firmware`] before initialization.

use std::fs;
use std::path::Path;

use object::Endianness;
use object::elf::{FileHeader32, PT_LOAD};
use object::read::elf::{FileHeader, ProgramHeader};
use tracing::debug;

use crate::common::error::FirmwareError;

/// Gaps between flattened segments read as erased flash.
const ERASED_FLASH: u8 = 0xFF;

/// A loaded firmware image plus the metadata the device needs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Firmware {
    /// Target device identifier (e.g. `"atmega168"`). Loaders leave this
    /// empty; callers fill it in.
    pub part: String,
    /// Clock frequency in hertz; zero means "use the part's default".
    pub frequency_hz: u64,
    /// Flash image, addressed from zero.
    pub image: Vec<u8>,
    /// Entry point, in flash byte addresses.
    pub entry: u64,
}

impl Firmware {
    /// Wraps raw image bytes with no metadata, for callers that assemble
    /// images in memory.
    #[must_use]
    pub fn from_image(image: Vec<u8>) -> Self {
        Self {
            image,
            ..Self::default()
        }
    }
}

/// Loads an ELF firmware image from disk.
pub fn load_elf(path: impl AsRef<Path>) -> Result<Firmware, FirmwareError> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|source| FirmwareError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let firmware = parse_elf(&data)?;
    debug!(
        path = %path.display(),
        bytes = firmware.image.len(),
        entry = firmware.entry,
        "ELF firmware loaded"
    );
    Ok(firmware)
}

/// Loads a raw flash dump from disk.
pub fn load_raw(path: impl AsRef<Path>) -> Result<Firmware, FirmwareError> {
    let path = path.as_ref();
    let image = fs::read(path).map_err(|source| FirmwareError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if image.is_empty() {
        return Err(FirmwareError::NoLoadableSegments);
    }
    debug!(path = %path.display(), bytes = image.len(), "raw firmware loaded");
    Ok(Firmware::from_image(image))
}

/// Flattens the `PT_LOAD` segments of a 32-bit ELF into a flash image.
pub fn parse_elf(data: &[u8]) -> Result<Firmware, FirmwareError> {
    let header = FileHeader32::<Endianness>::parse(data)?;
    let endian = header.endian()?;

    let mut image: Vec<u8> = Vec::new();
    for segment in header.program_headers(endian, data)? {
        if segment.p_type(endian) != PT_LOAD || segment.p_filesz(endian) == 0 {
            continue;
        }
        let bytes = segment
            .data(endian, data)
            .map_err(|()| FirmwareError::Truncated)?;
        let start = segment.p_paddr(endian) as usize;
        let end = start + bytes.len();
        if image.len() < end {
            image.resize(end, ERASED_FLASH);
        }
        image[start..end].copy_from_slice(bytes);
    }
    if image.is_empty() {
        return Err(FirmwareError::NoLoadableSegments);
    }

    Ok(Firmware {
        part: String::new(),
        frequency_hz: 0,
        image,
        entry: u64::from(header.e_entry(endian)),
    })
}
