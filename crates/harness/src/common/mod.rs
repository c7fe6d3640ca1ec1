//! Common types shared across the harness.
//!
//! This module provides:
//! 1. **Errors:** The error taxonomy for device setup, firmware loading,
//!    and trace recording.
//! 2. **Time:** Simulated-time representation and the shared cycle clock.

/// Error types for device setup, firmware loading, and tracing.
pub mod error;
/// Simulated time in microseconds and the shared cycle counter.
pub mod time;
