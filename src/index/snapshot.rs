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

//! Index persistence.
//!
//! A snapshot is a directory with two files: `index.bin` (bincode encoded
//! vectors) and `texts.txt` (one escaped source text per line, in insertion
//! order). Snapshots are staged in a hidden directory under the base and
//! renamed into place once both files are written. Nothing is written
//! implicitly; callers save explicitly.

use anyhow::{Context, Result};
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::index::store::VectorIndex;
use crate::index::types::{IndexFile, INDEX_FILE_VERSION};
use crate::storage::write_atomically;

pub const INDEX_FILE_NAME: &str = "index.bin";
pub const TEXTS_FILE_NAME: &str = "texts.txt";

impl VectorIndex {
    /// Write the vector file and the text file into `dir`
    pub fn save(&self, dir: &Path) -> Result<()> {
        let index_path = dir.join(INDEX_FILE_NAME);
        let texts_path = dir.join(TEXTS_FILE_NAME);

        let file = IndexFile {
            version: INDEX_FILE_VERSION,
            dimension: self.dimension(),
            vectors: self.vectors.clone(),
        };

        // index.bin marks a snapshot as present, so it goes last
        write_atomically(&texts_path, |w| {
            for text in &self.texts {
                w.write_all(escape_line(text).as_bytes())?;
                w.write_all(b"\n")?;
            }
            Ok(())
        })?;

        write_atomically(&index_path, |w| {
            bincode::serialize_into(w, &file).context("Failed to encode index")?;
            Ok(())
        })?;

        info!(
            path = %dir.display(),
            entries = self.len(),
            "Index saved"
        );
        Ok(())
    }

    /// Replace the index content with the snapshot in `dir`.
    ///
    /// Returns `Ok(false)` when the vector file does not exist; the index is
    /// left unchanged. A snapshot that does not match this index (dimension,
    /// entry counts) is an error and also leaves the index unchanged.
    pub fn load(&mut self, dir: &Path) -> Result<bool> {
        let index_path = dir.join(INDEX_FILE_NAME);
        let texts_path = dir.join(TEXTS_FILE_NAME);

        if !index_path.is_file() {
            warn!(path = %index_path.display(), "Index file does not exist");
            return Ok(false);
        }

        let reader = BufReader::new(
            fs::File::open(&index_path)
                .with_context(|| format!("Failed to open {}", index_path.display()))?,
        );
        let file: IndexFile = bincode::deserialize_from(reader)
            .with_context(|| format!("Failed to decode {}", index_path.display()))?;

        if file.version != INDEX_FILE_VERSION {
            anyhow::bail!("Unsupported index file version {}", file.version);
        }
        if file.dimension != self.dimension() {
            anyhow::bail!(
                "Index dimension mismatch: snapshot has {}, index expects {}",
                file.dimension,
                self.dimension()
            );
        }
        if let Some(bad) = file.vectors.iter().position(|v| v.len() != file.dimension) {
            anyhow::bail!("Vector {} has wrong length", bad);
        }

        let content = fs::read_to_string(&texts_path)
            .with_context(|| format!("Failed to read {}", texts_path.display()))?;
        let texts = parse_texts(&content);

        if texts.len() != file.vectors.len() {
            anyhow::bail!(
                "Snapshot is inconsistent: {} vectors but {} texts",
                file.vectors.len(),
                texts.len()
            );
        }

        self.vectors = file.vectors;
        self.texts = texts;

        info!(path = %dir.display(), entries = self.len(), "Index loaded");
        Ok(true)
    }

    /// Save into a new `<base>/<YYYYmmdd_HHMMSS>/` directory.
    /// Returns `Ok(None)` without writing when the index is empty.
    ///
    /// On error no snapshot directory becomes visible under `base`. A second
    /// save within the same second gets a `_N` suffix instead of overwriting.
    pub fn save_snapshot(&self, base: &Path) -> Result<Option<PathBuf>> {
        if self.is_empty() {
            warn!("No data to save");
            return Ok(None);
        }

        fs::create_dir_all(base)
            .with_context(|| format!("Failed to create directory {}", base.display()))?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(base)
            .with_context(|| format!("Failed to create staging directory in {}", base.display()))?;
        self.save(staging.path())?;

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let dir = unused_snapshot_dir(base, &stamp);
        fs::rename(staging.path(), &dir)
            .with_context(|| format!("Failed to move snapshot to {}", dir.display()))?;

        info!(path = %dir.display(), "Index snapshot created");
        Ok(Some(dir))
    }

    /// Load the most recent loadable snapshot under `base`.
    ///
    /// Snapshots that fail to load are reported and skipped in favour of the
    /// next older one. Returns `Ok(false)` when none can be loaded.
    pub fn load_latest(&mut self, base: &Path) -> Result<bool> {
        let snapshots = snapshot_dirs(base)?;
        if snapshots.is_empty() {
            info!(path = %base.display(), "No index snapshot found");
            return Ok(false);
        }

        for dir in &snapshots {
            match self.load(dir) {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(e) => {
                    warn!(path = %dir.display(), error = %e, "Skipping unloadable index snapshot");
                }
            }
        }

        warn!(path = %base.display(), "No loadable index snapshot found");
        Ok(false)
    }
}

const STAGING_PREFIX: &str = ".staging-";

/// Snapshot directories under `base`, newest first by directory name.
/// Hidden entries (staging directories) are ignored.
pub fn snapshot_dirs(base: &Path) -> Result<Vec<PathBuf>> {
    if !base.is_dir() {
        return Ok(Vec::new());
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(base)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.join(INDEX_FILE_NAME).is_file() {
            candidates.push(path);
        }
    }

    candidates.sort_by(|a, b| b.cmp(a));
    Ok(candidates)
}

fn unused_snapshot_dir(base: &Path, stamp: &str) -> PathBuf {
    let mut dir = base.join(stamp);
    let mut n = 1;
    while dir.exists() {
        dir = base.join(format!("{}_{}", stamp, n));
        n += 1;
    }
    dir
}

fn escape_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

fn unescape_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn parse_texts(content: &str) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }
    content
        .strip_suffix('\n')
        .unwrap_or(content)
        .split('\n')
        .map(unescape_line)
        .collect()
}
