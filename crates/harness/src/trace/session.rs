//! Trace sessions.
//!
//! A session binds an output file to a set of registered signal channels and
//! records every value change with its simulated timestamp. Capture is
//! change-driven: registration subscribes to the device's notification
//! mechanism, so transitions narrower than any polling interval are still
//! recorded. The write path runs on whatever thread advances the simulation,
//! while `start`/`stop` arrive from the controlling thread; all session
//! state therefore lives behind one mutex.
//!
//! A write failure after `start` disables the session (logged once); the
//! simulation itself is never disturbed by tracing.

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::common::error::TraceError;
use crate::common::time::SimClock;
use crate::mcu::Mcu;
use crate::mcu::io::SignalId;
use crate::trace::vcd::{VarId, VcdWriter};

/// Scope name declared in the trace header.
const TRACE_SCOPE: &str = "lantern";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionState {
    /// Channels may be registered; nothing recorded yet.
    Setup,
    /// Header written, changes are being recorded.
    Recording,
    /// Recording suspended; may be resumed into the same file.
    Stopped,
    /// Disabled after a write failure.
    Failed,
}

struct SessionInner {
    writer: VcdWriter<BufWriter<File>>,
    clock: SimClock,
    resolution_micros: u64,
    state: SessionState,
    names: Vec<String>,
    path: PathBuf,
}

impl SessionInner {
    /// Write path, called from the advancement thread on every change.
    fn record(&mut self, var: VarId, value: u32) {
        if self.state != SessionState::Recording {
            return;
        }
        let stamp = self.clock.now().quantize(self.resolution_micros);
        if let Err(error) = self.writer.change(stamp.as_micros(), var, value) {
            warn!(path = %self.path.display(), %error, "trace write failed; disabling session");
            self.state = SessionState::Failed;
        }
    }
}

/// One open waveform-recording session.
///
/// Cheap to clone handles are not provided; the session itself is the
/// shared handle (its state sits behind an `Arc<Mutex<_>>`), so `start` and
/// `stop` may be called from a different thread than the one that records.
pub struct TraceSession {
    inner: Arc<Mutex<SessionInner>>,
}

impl TraceSession {
    /// Opens a session writing to `path` with the given sampling resolution.
    ///
    /// The file is created (truncated) eagerly so an unwritable path
    /// surfaces here, at setup, rather than mid-run. Timestamps are rounded
    /// down to multiples of `resolution_micros`; a resolution of zero or one
    /// keeps exact microsecond stamps.
    pub fn open(
        path: impl AsRef<Path>,
        resolution_micros: u64,
        clock: SimClock,
    ) -> Result<Self, TraceError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| TraceError::Open {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), resolution_micros, "trace session opened");
        Ok(Self {
            inner: Arc::new(Mutex::new(SessionInner {
                writer: VcdWriter::new(BufWriter::new(file)),
                clock,
                resolution_micros,
                state: SessionState::Setup,
                names: Vec::new(),
                path,
            })),
        })
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        // A poisoning panic can only come from the write path; recover the
        // guard and let the Failed state handle the rest.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers one named channel and subscribes it to signal changes.
    ///
    /// Channels appear in the trace header in registration order. Duplicate
    /// display names and registration after the first `start` both fail
    /// fast; a half-configured session would silently corrupt the artifact.
    pub fn add_signal(
        &self,
        mcu: &mut Mcu,
        id: SignalId,
        width: u8,
        name: &str,
    ) -> Result<(), TraceError> {
        let var = {
            let mut inner = self.lock();
            if inner.state != SessionState::Setup {
                return Err(TraceError::AlreadyStarted);
            }
            if inner.names.iter().any(|n| n == name) {
                return Err(TraceError::DuplicateChannel(name.to_owned()));
            }
            inner.names.push(name.to_owned());
            inner.writer.declare(name, width)
        };
        let sink = Arc::clone(&self.inner);
        mcu.subscribe(
            id,
            Box::new(move |value| {
                let mut inner = sink.lock().unwrap_or_else(PoisonError::into_inner);
                inner.record(var, value);
            }),
        );
        Ok(())
    }

    /// Begins (or resumes) recording.
    ///
    /// The first call writes the header; every change on a registered signal
    /// from then on produces exactly one record. Calling `start` on a
    /// session that is already recording is a no-op. After `stop`, `start`
    /// resumes into the same file.
    pub fn start(&self) -> Result<(), TraceError> {
        let mut inner = self.lock();
        match inner.state {
            SessionState::Recording => Ok(()),
            SessionState::Setup => {
                inner.writer.write_header(TRACE_SCOPE)?;
                inner.state = SessionState::Recording;
                info!(path = %inner.path.display(), channels = inner.names.len(), "trace started");
                Ok(())
            }
            SessionState::Stopped => {
                inner.state = SessionState::Recording;
                info!(path = %inner.path.display(), "trace resumed");
                Ok(())
            }
            SessionState::Failed => Err(TraceError::Disabled),
        }
    }

    /// Stops recording and flushes, leaving a valid artifact on disk.
    ///
    /// Idempotent: stopping a stopped (or never-started) session flushes
    /// again and changes nothing else.
    pub fn stop(&self) -> Result<(), TraceError> {
        let mut inner = self.lock();
        if inner.state == SessionState::Recording {
            inner.state = SessionState::Stopped;
            info!(path = %inner.path.display(), "trace stopped");
        }
        inner.writer.flush()?;
        Ok(())
    }

    /// Whether the session is actively recording.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.lock().state == SessionState::Recording
    }

    /// Path of the trace artifact.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.lock().path.clone()
    }
}

impl fmt::Debug for TraceSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("TraceSession")
            .field("path", &inner.path)
            .field("state", &inner.state)
            .field("channels", &inner.names.len())
            .finish_non_exhaustive()
    }
}
