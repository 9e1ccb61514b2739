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

//! Probe worker loop.
//!
//! Each probe runs on its own thread: resolve the script once, then
//! invoke it repeatedly, publishing the tri-state outcome after every
//! run and sleeping between runs in fine slices so a stop request is
//! honored quickly.

use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::error::ProbeError;
use crate::resolve::SearchPath;
use crate::state::{ProbeKind, SharedState, TriState};

/// Settings for a single probe worker.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Which shared cell this probe publishes to.
    pub kind: ProbeKind,
    /// Script name resolved through the search path.
    pub script: String,
    /// Delay between invocations.
    pub interval: Duration,
    /// Granularity of the stop-flag check while sleeping.
    pub poll_slice: Duration,
    /// Directories scanned when resolving the script.
    pub search: SearchPath,
}

/// Run one probe until the shared running flag is cleared.
///
/// If the script cannot be located the probe publishes `Unknown` and
/// returns immediately; resolution is never retried.
pub fn run_probe(config: &ProbeConfig, state: &SharedState) {
    let name = config.kind.name();

    let Some(path) = config.search.resolve(&config.script) else {
        warn!(
            "[{}] {}",
            name,
            ProbeError::NotFound(config.script.clone())
        );
        state.set_probe(config.kind, TriState::Unknown);
        return;
    };
    info!("[{}] using probe script {}", name, path.display());

    while state.is_running() {
        let result = match invoke(&path) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("[{}] {}", name, err);
                TriState::Fail
            }
        };
        state.set_probe(config.kind, result);
        sleep_with_stop_checks(state, config.interval, config.poll_slice);
    }

    debug!("[{}] probe loop stopped", name);
}

/// Invoke the resolved script once with output discarded.
///
/// Exit status zero is `Ok`, any other exit is `Fail`. A spawn failure
/// is reported as an error so callers can log it, but it maps to the
/// same `Fail` outcome.
fn invoke(path: &Path) -> Result<TriState, ProbeError> {
    let status = Command::new(path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|source| ProbeError::Launch {
            path: path.to_path_buf(),
            source,
        })?;

    if status.success() {
        Ok(TriState::Ok)
    } else {
        debug!("{} exited with {}", path.display(), status);
        Ok(TriState::Fail)
    }
}

/// Sleep for `interval`, waking every `poll_slice` to check the stop
/// flag so shutdown latency is bounded by the slice, not the interval.
fn sleep_with_stop_checks(state: &SharedState, interval: Duration, poll_slice: Duration) {
    let deadline = Instant::now() + interval;
    while state.is_running() {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep(poll_slice.min(deadline - now));
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
        path
    }

    fn probe_config(kind: ProbeKind, script: &str, dir: &Path) -> ProbeConfig {
        ProbeConfig {
            kind,
            script: script.to_string(),
            interval: Duration::from_millis(20),
            poll_slice: Duration::from_millis(5),
            search: SearchPath {
                use_env_path: false,
                fallback_dirs: vec![dir.to_path_buf()],
            },
        }
    }

    #[test]
    fn test_invoke_success_and_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ok = write_script(dir.path(), "ok.sh", "exit 0");
        let fail = write_script(dir.path(), "fail.sh", "exit 3");

        assert_eq!(invoke(&ok).expect("invoke ok"), TriState::Ok);
        assert_eq!(invoke(&fail).expect("invoke fail"), TriState::Fail);
    }

    #[test]
    fn test_invoke_launch_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.sh");
        assert!(matches!(
            invoke(&missing),
            Err(ProbeError::Launch { .. })
        ));
    }

    #[test]
    fn test_missing_script_leaves_probe_unknown_permanently() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = SharedState::new();
        let config = probe_config(ProbeKind::Network, "no_such_probe.sh", dir.path());

        // Returns without looping; the cell stays Unknown and the other
        // probe's cell is untouched.
        run_probe(&config, &state);
        assert_eq!(state.probe(ProbeKind::Network), TriState::Unknown);
        assert_eq!(state.probe(ProbeKind::Serial), TriState::Unknown);
        assert!(state.is_running());
    }

    #[test]
    fn test_loop_publishes_ok_then_stops() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_script(dir.path(), "ok.sh", "exit 0");

        let state = Arc::new(SharedState::new());
        let config = probe_config(ProbeKind::Serial, "ok.sh", dir.path());

        let worker_state = Arc::clone(&state);
        let worker = thread::spawn(move || run_probe(&config, &worker_state));

        // Wait for the first published result.
        let deadline = Instant::now() + Duration::from_secs(5);
        while state.probe(ProbeKind::Serial) == TriState::Unknown {
            assert!(Instant::now() < deadline, "probe never published");
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(state.probe(ProbeKind::Serial), TriState::Ok);

        state.request_stop();
        worker.join().expect("worker thread");
    }

    #[test]
    fn test_stop_is_honored_within_a_slice_not_the_full_interval() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_script(dir.path(), "ok.sh", "exit 0");

        let state = Arc::new(SharedState::new());
        let mut config = probe_config(ProbeKind::Network, "ok.sh", dir.path());
        config.interval = Duration::from_secs(30);
        config.poll_slice = Duration::from_millis(10);

        let worker_state = Arc::clone(&state);
        let worker = thread::spawn(move || run_probe(&config, &worker_state));

        let deadline = Instant::now() + Duration::from_secs(5);
        while state.probe(ProbeKind::Network) == TriState::Unknown {
            assert!(Instant::now() < deadline, "probe never published");
            thread::sleep(Duration::from_millis(5));
        }

        let stop_requested = Instant::now();
        state.request_stop();
        worker.join().expect("worker thread");

        // Well under the 30 s interval; bound is one invocation plus a
        // poll slice, with generous headroom for slow CI machines.
        assert!(stop_requested.elapsed() < Duration::from_secs(5));
    }
}
