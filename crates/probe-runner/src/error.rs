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

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while running a probe.
///
/// These only feed logging and diagnostics. The externally visible
/// outcome of any probe failure is the unified tri-state value: a
/// missing script surfaces as permanent `Unknown`, and a launch error
/// surfaces as `Fail` exactly like a nonzero exit.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The script is absent from every searched directory.
    #[error("probe script '{0}' not found in any searched directory")]
    NotFound(String),

    /// The resolved executable could not be spawned.
    #[error("failed to launch {path}: {source}")]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
