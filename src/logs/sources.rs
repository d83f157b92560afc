// Copyright 2026 Muvon Un Limited
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

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Read a UTF-8 log file
pub fn read_log_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read log file {}", path.display()))
}

/// Recursively find files under `dir` whose name matches `pattern`.
/// Results are sorted so loads are reproducible.
pub fn find_log_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Log directory not found: {}", dir.display());
    }

    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let full_pattern = format!("{}/**/{}", escaped, pattern);

    let mut files = Vec::new();
    for entry in glob::glob(&full_pattern)
        .with_context(|| format!("Invalid log file pattern: {}", pattern))?
    {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Skipping unreadable path"),
        }
    }

    files.sort();
    Ok(files)
}
