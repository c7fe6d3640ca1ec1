//! Signal trace recording.
//!
//! This module provides:
//! 1. **VCD writer:** Streaming Value Change Dump output any waveform
//!    viewer reads.
//! 2. **Sessions:** Lifecycle (open, register, start/stop) around one
//!    output artifact, safe to drive across threads at session boundaries.

/// Trace session lifecycle and the change-driven write path.
pub mod session;
/// Streaming VCD (Value Change Dump) writer.
pub mod vcd;

pub use session::TraceSession;
pub use vcd::{VarId, VcdWriter};
