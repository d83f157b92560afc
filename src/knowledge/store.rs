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
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::config::KnowledgeColumns;
use crate::knowledge::types::{KnowledgeEntry, KnowledgeMatch, SolutionRecord};
use crate::storage::write_atomically;

/// Problem/solution table backed by a CSV file.
///
/// The first row of the file defines `headers`; every entry carries a value
/// for every header. `columns` maps the logical fields (problem name,
/// category, ...) onto header names.
pub struct KnowledgeBase {
    columns: KnowledgeColumns,
    headers: Vec<String>,
    entries: Vec<KnowledgeEntry>,
    path: Option<PathBuf>,
}

impl KnowledgeBase {
    pub fn new(columns: KnowledgeColumns) -> Self {
        Self {
            columns,
            headers: Vec::new(),
            entries: Vec::new(),
            path: None,
        }
    }

    /// Create a knowledge base and load `path` into it.
    /// A missing or unreadable file leaves it empty.
    pub fn open(path: &Path, columns: KnowledgeColumns) -> Self {
        let mut kb = Self::new(columns);
        kb.path = Some(path.to_path_buf());
        kb.load(path);
        kb
    }

    pub fn columns(&self) -> &KnowledgeColumns {
        &self.columns
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File the table was loaded from, used as the default save target
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Replace the table with the content of `path`.
    /// Returns false, leaving the table unchanged, when the file is absent or unreadable.
    pub fn load(&mut self, path: &Path) -> bool {
        if !path.is_file() {
            warn!(path = %path.display(), "Knowledge base file not found");
            return false;
        }

        match read_table(path) {
            Ok((headers, entries)) => {
                info!(
                    path = %path.display(),
                    entries = entries.len(),
                    "Knowledge base loaded"
                );
                self.headers = headers;
                self.entries = entries;
                self.path = Some(path.to_path_buf());
                true
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read knowledge base");
                false
            }
        }
    }

    /// Find entries containing any of `keywords`, best matches first.
    ///
    /// The score is the number of distinct keywords found, case-insensitively,
    /// anywhere in the entry's values. With `category`, only entries in that
    /// category (case-insensitive) are considered.
    pub fn search<S: AsRef<str>>(
        &self,
        keywords: &[S],
        category: Option<&str>,
    ) -> Vec<KnowledgeMatch> {
        let keywords: BTreeSet<String> = keywords
            .iter()
            .map(|k| k.as_ref().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        let category = category
            .filter(|c| !c.is_empty())
            .map(|c| c.to_lowercase());

        let mut results: Vec<KnowledgeMatch> = Vec::new();

        for entry in &self.entries {
            if let Some(category) = &category {
                let entry_category = entry.get(&self.columns.category).unwrap_or("");
                if entry_category.to_lowercase() != *category {
                    continue;
                }
            }

            let text = self.entry_text(entry);
            let match_score = keywords.iter().filter(|k| text.contains(k.as_str())).count();

            if match_score > 0 {
                results.push(KnowledgeMatch {
                    entry: entry.clone(),
                    match_score,
                });
            }
        }

        // Stable: equal scores keep file order
        results.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        results
    }

    /// First entry whose problem name equals `name`, ignoring case
    pub fn get_by_name(&self, name: &str) -> Option<&KnowledgeEntry> {
        let name = name.to_lowercase();
        self.entries.iter().find(|entry| {
            entry
                .get(&self.columns.problem_name)
                .is_some_and(|n| n.to_lowercase() == name)
        })
    }

    /// Distinct non-empty categories, sorted
    pub fn categories(&self) -> Vec<String> {
        let categories: BTreeSet<String> = self
            .entries
            .iter()
            .filter_map(|entry| entry.get(&self.columns.category))
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        categories.into_iter().collect()
    }

    /// Append a new entry.
    /// A table without headers adopts the configured column names first.
    pub fn add_entry(&mut self, record: SolutionRecord) -> bool {
        if self.headers.is_empty() {
            self.headers = self.columns.ordered();
        }

        let mut fields: HashMap<String, String> = self
            .headers
            .iter()
            .map(|h| (h.clone(), String::new()))
            .collect();

        let values = [
            (&self.columns.problem_name, record.problem_name),
            (&self.columns.category, record.category),
            (&self.columns.solution, record.solution),
            (&self.columns.details, record.details),
            (&self.columns.prevention, record.prevention),
            (&self.columns.reference, record.reference),
        ];
        for (header, value) in values {
            fields.insert(header.clone(), value);
        }

        self.entries.push(KnowledgeEntry::from_fields(fields));
        true
    }

    /// Write headers and entries to `path`.
    /// Returns false on I/O error; an existing file is never left half-written.
    pub fn save(&self, path: &Path) -> bool {
        match self.write_table(path) {
            Ok(()) => {
                info!(path = %path.display(), entries = self.entries.len(), "Knowledge base saved");
                true
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to save knowledge base");
                false
            }
        }
    }

    fn write_table(&self, path: &Path) -> Result<()> {
        write_atomically(path, |w| {
            let mut writer = csv::Writer::from_writer(w);
            if !self.headers.is_empty() {
                writer.write_record(&self.headers)?;
            }
            for entry in &self.entries {
                writer.write_record(self.headers.iter().map(|h| entry.get(h).unwrap_or("")))?;
            }
            writer.flush()?;
            Ok(())
        })
    }

    /// Lowercased values of an entry in header order
    fn entry_text(&self, entry: &KnowledgeEntry) -> String {
        self.headers
            .iter()
            .map(|h| entry.get(h).unwrap_or(""))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

fn read_table(path: &Path) -> Result<(Vec<String>, Vec<KnowledgeEntry>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read header row")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut entries = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read row {}", row + 2))?;
        // Short rows are skipped, extra fields ignored
        if record.len() < headers.len() {
            continue;
        }
        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        entries.push(KnowledgeEntry::from_fields(fields));
    }

    Ok((headers, entries))
}
