// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tri-state probe results and the shared atomic cells that bridge the
//! probe workers and the UI refresh path.

use std::sync::atomic::{AtomicBool, AtomicI8, Ordering};

/// Result granularity for a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum TriState {
    /// No completed run yet, or the probe executable could not be located.
    Unknown = -1,
    /// The last invocation exited nonzero or failed to launch.
    Fail = 0,
    /// The last invocation exited with status zero.
    Ok = 1,
}

impl TriState {
    /// Decode the raw cell value. Anything outside the valid encodings
    /// maps to `Unknown`.
    #[must_use]
    pub const fn from_raw(raw: i8) -> Self {
        match raw {
            1 => Self::Ok,
            0 => Self::Fail,
            _ => Self::Unknown,
        }
    }

    /// Encode for storage in an atomic cell.
    #[must_use]
    pub const fn as_raw(self) -> i8 {
        self as i8
    }
}

/// Identifies one monitored probe and its cell in [`SharedState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    Network,
    Serial,
}

impl ProbeKind {
    /// Display name used for captions and log messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Serial => "serial",
        }
    }
}

/// Shared cells bridging the probe workers and the render path.
///
/// Each probe cell has exactly one writer (its own worker loop) and the
/// running flag is written only by the shutdown path. Everything else
/// just reads, so plain single-word atomic load/store is enough and no
/// locking is needed anywhere.
#[derive(Debug)]
pub struct SharedState {
    network: AtomicI8,
    serial: AtomicI8,
    running: AtomicBool,
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedState {
    /// Create fresh state: both probes `Unknown`, running flag set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            network: AtomicI8::new(TriState::Unknown.as_raw()),
            serial: AtomicI8::new(TriState::Unknown.as_raw()),
            running: AtomicBool::new(true),
        }
    }

    fn cell(&self, kind: ProbeKind) -> &AtomicI8 {
        match kind {
            ProbeKind::Network => &self.network,
            ProbeKind::Serial => &self.serial,
        }
    }

    /// Latest published result for the given probe.
    #[must_use]
    pub fn probe(&self, kind: ProbeKind) -> TriState {
        TriState::from_raw(self.cell(kind).load(Ordering::Relaxed))
    }

    /// Publish a result for the given probe.
    ///
    /// Only the probe's own worker loop may call this.
    pub fn set_probe(&self, kind: ProbeKind, value: TriState) {
        self.cell(kind).store(value.as_raw(), Ordering::Relaxed);
    }

    /// Whether the worker loops should keep going.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Ask all worker loops to stop at their next flag check.
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }
}
