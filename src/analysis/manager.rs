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

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::analysis::keywords::KeywordExtractor;
use crate::analysis::prompt::{build_context, build_messages, build_prompt};
use crate::config::{Config, RequestsConfig, RetrievalConfig};
use crate::index::{QueryResult, VectorIndex};
use crate::knowledge::formatting::NOT_FOUND_MESSAGE;
use crate::knowledge::{KnowledgeBase, KnowledgeMatch, SolutionRecord};
use crate::llm::{create_backend, GenerationBackend};
use crate::logs::{find_log_files, read_log_file, LogChunker};

pub const NO_RELEVANT_ENTRIES: &str = "関連するログエントリが見つかりませんでした。";

/// Everything assembled for one request before generation
#[derive(Debug, Clone)]
pub struct PreparedAnalysis {
    pub results: Vec<QueryResult>,
    pub context: String,
    pub keywords: BTreeSet<String>,
    pub solutions: Vec<KnowledgeMatch>,
    pub prompt: String,
}

/// Retrieval-augmented log analysis session.
///
/// Owns the vector index and the knowledge base. Logs are loaded any number
/// of times; each request retrieves chunks, looks up known remedies and asks
/// the generation backend for a summary.
pub struct LogAnalyzer {
    retrieval: RetrievalConfig,
    requests: RequestsConfig,
    file_pattern: String,
    system_prompt: String,
    custom_system_prompt: String,
    chunker: LogChunker,
    keywords: KeywordExtractor,
    index: VectorIndex,
    knowledge: KnowledgeBase,
    backend: Box<dyn GenerationBackend>,
}

impl LogAnalyzer {
    pub fn new(config: &Config) -> Result<Self> {
        let backend = create_backend(&config.llm)?;
        Self::with_backend(config, backend)
    }

    pub fn with_backend(config: &Config, backend: Box<dyn GenerationBackend>) -> Result<Self> {
        let chunker = LogChunker::new(&config.chunking)?;
        let index = VectorIndex::new(config.index.dimension)
            .with_display_chars(config.retrieval.display_chars);
        let knowledge = KnowledgeBase::open(&config.knowledge.path, config.knowledge.columns.clone());

        info!(
            backend = backend.name(),
            dimension = config.index.dimension,
            knowledge_entries = knowledge.len(),
            "Log analyzer ready"
        );

        Ok(Self {
            retrieval: config.retrieval.clone(),
            requests: config.requests.clone(),
            file_pattern: config.logs.file_pattern.clone(),
            system_prompt: config.llm.system_prompt.clone(),
            custom_system_prompt: config.llm.custom_system_prompt.clone(),
            chunker,
            keywords: KeywordExtractor::new(&config.knowledge),
            index,
            knowledge,
            backend,
        })
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Load a single file, or every matching file below a directory
    pub fn load_path(&mut self, path: &Path, pattern: Option<&str>) -> bool {
        if path.is_dir() {
            self.load_log_directory(path, pattern)
        } else {
            self.load_log_file(path)
        }
    }

    /// Chunk a log file and add its non-empty chunks to the index
    pub fn load_log_file(&mut self, path: &Path) -> bool {
        let content = match read_log_file(path) {
            Ok(content) => content,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to load log file");
                return false;
            }
        };

        let chunks: Vec<String> = self
            .chunker
            .split(&content)
            .into_iter()
            .filter(|chunk| !chunk.trim().is_empty())
            .collect();

        for chunk in &chunks {
            self.index.add(chunk);
        }

        info!(path = %path.display(), chunks = chunks.len(), "Log file loaded");
        true
    }

    /// Load every file below `dir` matching `pattern` (default from config).
    /// Returns true when at least one file was loaded.
    pub fn load_log_directory(&mut self, dir: &Path, pattern: Option<&str>) -> bool {
        let pattern = pattern.unwrap_or(&self.file_pattern).to_string();
        let files = match find_log_files(dir, &pattern) {
            Ok(files) => files,
            Err(e) => {
                error!(path = %dir.display(), error = %e, "Failed to scan log directory");
                return false;
            }
        };

        let loaded = files
            .iter()
            .filter(|file| self.load_log_file(file))
            .count();

        if loaded == 0 {
            warn!(path = %dir.display(), pattern = %pattern, "No log files loaded");
        } else {
            info!(path = %dir.display(), files = loaded, "Log directory loaded");
        }
        loaded > 0
    }

    /// Restore the newest index snapshot under `base`
    pub fn open_index(&mut self, base: &Path) -> Result<bool> {
        self.index.load_latest(base)
    }

    /// Persist the index as a new snapshot under `base`
    pub fn save_index(&self, base: &Path) -> Result<Option<PathBuf>> {
        self.index.save_snapshot(base)
    }

    /// Run retrieval and assemble the prompt for `user_request`.
    /// Returns `None` when nothing is indexed.
    pub fn prepare(&self, user_request: &str) -> Option<PreparedAnalysis> {
        let results = self.index.query(user_request, self.retrieval.top_k);
        if results.is_empty() {
            return None;
        }

        let context = build_context(&results, self.retrieval.context_entries);

        // Keywords come from the display text, the same view the prompt shows
        let keywords = self
            .keywords
            .extract(results.iter().map(|r| r.text.as_str()), user_request);

        let solutions: Vec<KnowledgeMatch> = if keywords.is_empty() {
            Vec::new()
        } else {
            let keyword_list: Vec<&str> = keywords.iter().map(String::as_str).collect();
            let mut matches = self.knowledge.search(&keyword_list, None);
            matches.truncate(self.retrieval.knowledge_entries);
            matches
        };

        let knowledge_text = (!solutions.is_empty())
            .then(|| self.knowledge.format_numbered(&solutions, solutions.len()));
        let prompt = build_prompt(user_request, &context, knowledge_text.as_deref());

        debug!(
            results = results.len(),
            keywords = ?keywords,
            solutions = solutions.len(),
            "Analysis prompt assembled"
        );

        Some(PreparedAnalysis {
            results,
            context,
            keywords,
            solutions,
            prompt,
        })
    }

    /// Summarize the logs relevant to `user_request`.
    /// Backend failures are returned as errors.
    pub async fn summarize_logs(&self, user_request: &str) -> Result<String> {
        let Some(prepared) = self.prepare(user_request) else {
            info!("No relevant log entries for request");
            return Ok(NO_RELEVANT_ENTRIES.to_string());
        };

        info!(
            results = prepared.results.len(),
            keywords = prepared.keywords.len(),
            solutions = prepared.solutions.len(),
            backend = self.backend.name(),
            "Requesting summary"
        );

        let messages = build_messages(
            &self.system_prompt,
            &self.custom_system_prompt,
            prepared.prompt,
        );
        self.backend.process(&messages).await
    }

    pub async fn summarize_default(&self) -> Result<String> {
        self.summarize_logs(&self.requests.default).await
    }

    pub async fn analyze_errors(&self) -> Result<String> {
        self.summarize_logs(&self.requests.errors).await
    }

    pub async fn analyze_performance(&self) -> Result<String> {
        self.summarize_logs(&self.requests.performance).await
    }

    pub async fn timeline_summary(&self) -> Result<String> {
        self.summarize_logs(&self.requests.timeline).await
    }

    /// Raw vector search over indexed chunks
    pub fn search_logs(&self, query: &str, k: Option<usize>) -> Vec<QueryResult> {
        match k {
            Some(k) => self.index.query(query, k),
            None => self.index.search_by_keyword(query),
        }
    }

    /// Knowledge base matches for explicit keywords
    pub fn find_solutions(&self, keywords: &[String], category: Option<&str>) -> Vec<KnowledgeMatch> {
        self.knowledge.search(keywords, category)
    }

    /// Rendered top solutions for explicit keywords
    pub fn search_problem_solutions(&self, keywords: &[String]) -> String {
        let solutions = self.knowledge.search(keywords, None);
        if solutions.is_empty() {
            return NOT_FOUND_MESSAGE.to_string();
        }

        format!(
            "【検索された解決策】:\n\n{}",
            solutions
                .iter()
                .take(self.retrieval.knowledge_entries)
                .enumerate()
                .map(|(i, m)| format!("{}. {}\n\n", i + 1, self.knowledge.format(Some(&m.entry))))
                .collect::<String>()
        )
    }

    pub fn get_solution(&self, name: &str) -> String {
        self.knowledge.format(self.knowledge.get_by_name(name))
    }

    pub fn categories(&self) -> Vec<String> {
        self.knowledge.categories()
    }

    pub fn add_new_solution(&mut self, record: SolutionRecord) -> String {
        let name = record.problem_name.clone();
        if self.knowledge.add_entry(record) {
            format!("新しい解決策を追加しました: {}", name)
        } else {
            "解決策の追加に失敗しました。".to_string()
        }
    }

    /// Save the knowledge base to `path`, or back to the file it came from
    pub fn save_knowledge_base(&self, path: Option<&Path>) -> bool {
        match path.or_else(|| self.knowledge.path()) {
            Some(path) => self.knowledge.save(path),
            None => {
                error!("No knowledge base path to save to");
                false
            }
        }
    }
}
