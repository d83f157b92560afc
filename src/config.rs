// Copyright 2025 Muvon Un Limited
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
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub dimension: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { dimension: 512 }
    }
}

/// Log chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// A line matching any of these starts a new chunk
    pub boundary_patterns: Vec<String>,
    pub max_chunk_chars: usize,
    pub split_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            boundary_patterns: vec![
                r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}".to_string(),
                r"\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}".to_string(),
            ],
            max_chunk_chars: 1000,
            split_chars: 800,
        }
    }
}

/// Query phase configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub context_entries: usize,
    pub knowledge_entries: usize,
    pub display_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            context_entries: 5,
            knowledge_entries: 3,
            display_chars: 200,
        }
    }
}

/// Column names of the knowledge table for each logical field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KnowledgeColumns {
    pub problem_name: String,
    pub category: String,
    pub solution: String,
    pub details: String,
    pub prevention: String,
    pub reference: String,
}

impl KnowledgeColumns {
    /// Column names in table order
    pub fn ordered(&self) -> Vec<String> {
        vec![
            self.problem_name.clone(),
            self.category.clone(),
            self.solution.clone(),
            self.details.clone(),
            self.prevention.clone(),
            self.reference.clone(),
        ]
    }
}

impl Default for KnowledgeColumns {
    fn default() -> Self {
        Self {
            problem_name: "問題名".to_string(),
            category: "カテゴリ".to_string(),
            solution: "対処法".to_string(),
            details: "詳細説明".to_string(),
            prevention: "予防策".to_string(),
            reference: "参考情報".to_string(),
        }
    }
}

/// Knowledge base configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub path: PathBuf,
    pub columns: KnowledgeColumns,
    /// Terms looked up in retrieved log chunks
    pub log_keywords: Vec<String>,
    /// Terms looked up in the user request
    pub request_keywords: Vec<String>,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        let log_keywords = [
            "データベース",
            "database",
            "メモリ",
            "memory",
            "ネットワーク",
            "network",
            "エラー",
            "error",
            "接続",
            "connection",
            "タイムアウト",
            "timeout",
            "ログイン",
            "login",
            "ssl",
            "api",
            "バックアップ",
            "backup",
            "ディスク",
            "disk",
            "プロセス",
            "process",
        ];
        let request_keywords = [
            "エラー",
            "error",
            "パフォーマンス",
            "performance",
            "セキュリティ",
            "security",
        ];

        Self {
            path: PathBuf::from("data/knowledge_base.csv"),
            columns: KnowledgeColumns::default(),
            log_keywords: log_keywords.iter().map(|s| s.to_string()).collect(),
            request_keywords: request_keywords.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Log source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    pub file_pattern: String,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            file_pattern: "*.log".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Remote generation over the Ollama HTTP API
    Ollama,
    /// Local model-serving process fed through stdin
    Command,
}

/// Generation backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub backend: BackendKind,
    pub model: String,
    pub max_tokens: usize,
    pub system_prompt: String,
    pub custom_system_prompt: String,
    pub ollama_url: String,
    pub timeout_secs: u64,
    pub command: String,
    pub args: Vec<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Ollama,
            model: "elyza/Llama-3-ELYZA-JP-8B".to_string(),
            max_tokens: 1200,
            system_prompt: "あなたは誠実で優秀な日本人のアシスタントです。特に指示が無い場合は、常に日本語で回答してください。".to_string(),
            custom_system_prompt: String::new(),
            ollama_url: "http://localhost:11434".to_string(),
            timeout_secs: 300,
            command: "llama-cli".to_string(),
            args: Vec::new(),
        }
    }
}

/// Canned user requests for the analysis shortcuts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestsConfig {
    pub default: String,
    pub errors: String,
    pub performance: String,
    pub timeline: String,
}

impl Default for RequestsConfig {
    fn default() -> Self {
        Self {
            default: "ログの内容を要約してください".to_string(),
            errors: "エラーや例外について分析してください。原因と対策を含めて要約してください。"
                .to_string(),
            performance: "パフォーマンスや処理時間に関する問題を分析してください。".to_string(),
            timeline: "時系列順でログの流れを要約してください。重要なイベントを時間順に整理してください。"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write JSON logs to a daily rotated file in the storage directory
    pub file: bool,
    pub debug: bool,
}

/// Main configuration for lograg
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub index: IndexConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub knowledge: KnowledgeConfig,
    pub logs: LogsConfig,
    pub llm: LlmConfig,
    pub requests: RequestsConfig,
    pub logging: LoggingConfig,
}

const DEFAULT_TEMPLATE: &str = include_str!("../config-templates/default.toml");

impl Config {
    /// Load configuration from config.toml file
    /// First tries to load from system config directory, falls back to embedded template
    pub fn load() -> Result<Self> {
        let config_path = crate::storage::get_system_config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config: Self = toml::from_str(DEFAULT_TEMPLATE)?;

            if let Some(parent) = config_path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&config_path, DEFAULT_TEMPLATE)?;

            Ok(config)
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.index.dimension == 0 {
            anyhow::bail!("index.dimension must be positive");
        }
        if self.chunking.split_chars == 0 {
            anyhow::bail!("chunking.split_chars must be positive");
        }
        Ok(())
    }
}
