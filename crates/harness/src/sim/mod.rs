//! Firmware loading and execution supervision.
//!
//! This module provides:
//! 1. **Loader:** ELF and raw-binary firmware images flattened for flash.
//! 2. **Supervisor:** Instance ownership, background launch, and the
//!    foreground observation window.

/// Firmware image loading (ELF and raw flash dumps).
pub mod loader;
/// Instance ownership and the background advancement thread.
pub mod supervisor;

pub use loader::Firmware;
pub use supervisor::{RunHandle, Supervisor};
