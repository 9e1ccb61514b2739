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

//! Probe runner library for desktop health monitors.
//!
//! This library provides a small, reusable architecture for periodically
//! invoking external probe scripts and publishing their tri-state
//! results through lock-free shared state. The layers can be used
//! independently or composed together:
//!
//! - **State layer**: [`TriState`] results and the [`SharedState`]
//!   atomic cells with a single-writer-per-cell discipline
//! - **Resolve layer**: [`SearchPath`] lookup of probe scripts through
//!   the process `PATH` plus a fallback directory list
//! - **Worker layer**: the cooperative probe loop with fine-grained
//!   stop checks between invocations
//!
//! # Quick Start
//!
//! Use the [`Monitor`] type for full-stack operation:
//!
//! ```no_run
//! use probe_runner::{Monitor, MonitorConfig, ProbeKind};
//! use std::time::Duration;
//!
//! let monitor = Monitor::spawn(MonitorConfig::default());
//! let state = monitor.state();
//!
//! std::thread::sleep(Duration::from_secs(3));
//! println!("network is {:?}", state.probe(ProbeKind::Network));
//! println!("serial is {:?}", state.probe(ProbeKind::Serial));
//!
//! monitor.shutdown();
//! ```

pub mod resolve;
pub mod state;
pub mod worker;

mod error;

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{info, warn};

pub use error::ProbeError;
pub use resolve::{SearchPath, FALLBACK_DIRS};
pub use state::{ProbeKind, SharedState, TriState};
pub use worker::ProbeConfig;

/// Configuration for the full monitor (both probes).
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Script name for the network reachability probe.
    pub network_script: String,
    /// Script name for the serial connectivity probe.
    pub serial_script: String,
    /// Delay between probe invocations.
    pub interval: Duration,
    /// Granularity of the stop-flag check while sleeping.
    pub poll_slice: Duration,
    /// Directories scanned when resolving the scripts.
    pub search: SearchPath,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            network_script: "test_network.sh".to_string(),
            serial_script: "test_serial.sh".to_string(),
            interval: Duration::from_secs(2),
            poll_slice: Duration::from_millis(50),
            search: SearchPath::default(),
        }
    }
}

/// Full-stack monitor that owns the shared state and both probe workers.
///
/// Each probe runs on its own thread and only ever writes its own cell;
/// readers take a handle to the shared state via [`Monitor::state`].
pub struct Monitor {
    state: Arc<SharedState>,
    workers: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("workers", &self.workers.len())
            .finish_non_exhaustive()
    }
}

impl Monitor {
    /// Spawn both probe workers with the given configuration.
    #[must_use]
    pub fn spawn(config: MonitorConfig) -> Self {
        let state = Arc::new(SharedState::new());

        let probes = [
            (ProbeKind::Network, config.network_script.clone()),
            (ProbeKind::Serial, config.serial_script.clone()),
        ];

        let workers = probes
            .into_iter()
            .map(|(kind, script)| {
                let probe = ProbeConfig {
                    kind,
                    script,
                    interval: config.interval,
                    poll_slice: config.poll_slice,
                    search: config.search.clone(),
                };
                let state = Arc::clone(&state);
                std::thread::spawn(move || worker::run_probe(&probe, &state))
            })
            .collect();

        Self { state, workers }
    }

    /// Handle to the shared cells for the refresh/render path.
    #[must_use]
    pub fn state(&self) -> Arc<SharedState> {
        Arc::clone(&self.state)
    }

    /// Ask both workers to stop without waiting for them.
    pub fn request_stop(&self) {
        self.state.request_stop();
    }

    /// Stop both workers and wait for them to exit.
    ///
    /// A worker mid-invocation finishes that call first, so this blocks
    /// for at most one invocation's duration plus one poll slice.
    pub fn shutdown(self) {
        self.state.request_stop();
        for handle in self.workers {
            if handle.join().is_err() {
                warn!("probe worker panicked during shutdown");
            }
        }
        info!("monitor stopped");
    }
}
