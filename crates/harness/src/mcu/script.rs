//! Scripted stimulus core.
//!
//! Replays a timed schedule of signal transitions through the core-model
//! seam. This is the workhorse for harness development and tests: it
//! produces deterministic bus activity without an instruction-set simulator
//! attached. Schedules are built programmatically or deserialized from JSON.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::common::time::SimClock;
use crate::mcu::core::{CoreModel, DEFAULT_QUANTUM_CYCLES};
use crate::mcu::io::{IoHub, SignalKey};

/// One scheduled signal transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StimulusEvent {
    /// Simulated microseconds after the schedule's start.
    pub at: u64,
    /// Signal to drive.
    pub signal: SignalKey,
    /// Value to drive it to (masked to the signal's width).
    pub value: u32,
}

/// What the core does once the schedule is exhausted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnDrain {
    /// Keep consuming cycles without driving anything.
    #[default]
    Idle,
    /// Replay the schedule, re-anchored at the current time.
    Repeat,
}

/// A complete stimulus schedule.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Stimulus {
    /// Transitions to replay; sorted by time on construction.
    pub events: Vec<StimulusEvent>,
    /// Behavior after the last event.
    #[serde(default)]
    pub on_drain: OnDrain,
}

/// Errors raised while loading a stimulus schedule from disk.
#[derive(Debug, Error)]
pub enum StimulusError {
    /// The schedule file could not be read.
    #[error("could not read stimulus `{path}`")]
    Read {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The schedule file is not valid JSON for [`Stimulus`].
    #[error("malformed stimulus schedule")]
    Parse(#[from] serde_json::Error),
}

/// [`CoreModel`] that replays a [`Stimulus`], one event per step.
#[derive(Debug)]
pub struct ScriptedCore {
    events: Vec<StimulusEvent>,
    on_drain: OnDrain,
    next: usize,
    /// Microsecond offset of the current replay pass.
    base_micros: u64,
}

impl ScriptedCore {
    /// Builds a core from a schedule; events are stably sorted by time.
    #[must_use]
    pub fn new(mut stimulus: Stimulus) -> Self {
        stimulus.events.sort_by_key(|event| event.at);
        Self {
            events: stimulus.events,
            on_drain: stimulus.on_drain,
            next: 0,
            base_micros: 0,
        }
    }

    /// Loads a JSON schedule from disk.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, StimulusError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| StimulusError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let stimulus: Stimulus = serde_json::from_str(&text)?;
        Ok(Self::new(stimulus))
    }

    /// Number of events not yet replayed in the current pass.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.events.len() - self.next
    }
}

impl CoreModel for ScriptedCore {
    fn step(&mut self, clock: &SimClock, io: &mut IoHub) {
        let Some(event) = self.events.get(self.next) else {
            match self.on_drain {
                OnDrain::Idle => clock.advance(DEFAULT_QUANTUM_CYCLES),
                OnDrain::Repeat if self.events.is_empty() => {
                    clock.advance(DEFAULT_QUANTUM_CYCLES);
                }
                OnDrain::Repeat => {
                    self.base_micros = clock.now().as_micros();
                    self.next = 0;
                }
            }
            return;
        };

        let target = self.base_micros + event.at;
        let now = clock.now().as_micros();
        if target > now {
            clock.advance_micros(target - now);
        }
        match io.lookup(event.signal) {
            Some(id) => io.raise(id, event.value),
            None => warn!(signal = %event.signal, "stimulus drives a signal the part does not have"),
        }
        self.next += 1;
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
