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

//! Executable resolution for probe scripts.
//!
//! A script name is resolved by scanning the directories of the process
//! `PATH` variable in order, then a fixed fallback list. The first
//! directory containing an executable file of that name wins.

use std::env;
use std::path::{Path, PathBuf};

use log::debug;

/// Directories searched after `PATH`, in order.
pub const FALLBACK_DIRS: &[&str] = &["/usr/local/bin", "/usr/bin"];

/// Ordered set of directories scanned when resolving a probe script.
#[derive(Debug, Clone)]
pub struct SearchPath {
    /// Scan the directories of the process `PATH` variable first.
    pub use_env_path: bool,
    /// Directories searched after `PATH`, in order.
    pub fallback_dirs: Vec<PathBuf>,
}

impl Default for SearchPath {
    fn default() -> Self {
        Self {
            use_env_path: true,
            fallback_dirs: FALLBACK_DIRS.iter().copied().map(PathBuf::from).collect(),
        }
    }
}

impl SearchPath {
    /// Resolve `name` to an absolute executable path, or `None` when it
    /// is absent from every searched directory.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if self.use_env_path {
            if let Some(path_var) = env::var_os("PATH") {
                for dir in env::split_paths(&path_var) {
                    if dir.as_os_str().is_empty() {
                        continue;
                    }
                    if let Some(hit) = candidate(&dir, name) {
                        return Some(hit);
                    }
                }
            }
        }

        for dir in &self.fallback_dirs {
            if let Some(hit) = candidate(dir, name) {
                return Some(hit);
            }
        }

        debug!("'{}' not found in any searched directory", name);
        None
    }
}

fn candidate(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = dir.join(name);
    is_executable(&path).then_some(path)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
