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
use regex::RegexSet;

use crate::config::ChunkingConfig;

pub struct LogChunker {
    boundaries: RegexSet,
    max_chunk_chars: usize,
    split_chars: usize,
}

impl LogChunker {
    pub fn new(config: &ChunkingConfig) -> Result<Self> {
        let boundaries = RegexSet::new(&config.boundary_patterns)
            .context("Invalid chunk boundary pattern")?;

        Ok(Self {
            boundaries,
            max_chunk_chars: config.max_chunk_chars,
            split_chars: config.split_chars.max(1),
        })
    }

    /// Split raw log content into retrieval chunks.
    ///
    /// A new chunk starts at every line carrying a timestamp. Chunks longer
    /// than `max_chunk_chars` are sliced into `split_chars` pieces. Empty or
    /// whitespace-only chunks may be returned and must be filtered by the caller.
    pub fn split(&self, content: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in content.split('\n') {
            if self.is_boundary(line) && !current.is_empty() {
                chunks.push(current.join("\n"));
                current.clear();
            }
            current.push(line);
        }

        if !current.is_empty() {
            chunks.push(current.join("\n"));
        }

        chunks
            .into_iter()
            .flat_map(|chunk| self.resplit(chunk))
            .collect()
    }

    fn is_boundary(&self, line: &str) -> bool {
        self.boundaries.is_match(line)
    }

    /// Slice an oversized chunk into fixed-size pieces, counted in characters
    fn resplit(&self, chunk: String) -> Vec<String> {
        if chunk.chars().count() <= self.max_chunk_chars {
            return vec![chunk];
        }

        let chars: Vec<char> = chunk.chars().collect();
        chars
            .chunks(self.split_chars)
            .map(|piece| piece.iter().collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker() -> LogChunker {
        LogChunker::new(&ChunkingConfig::default()).unwrap()
    }

    const SAMPLE: &str = "2024-08-30 10:00:01 INFO アプリケーション開始
2024-08-30 10:00:05 INFO データベース接続確立
2024-08-30 10:02:30 ERROR データベース接続エラー: Connection timeout
  at db.connect(pool.rs:42)
  at app.run(main.rs:10)
2024/08/30 10:02:31 INFO 再接続を試行中...";

    #[test]
    fn test_split_on_timestamps() {
        let chunks = chunker().split(SAMPLE);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0], "2024-08-30 10:00:01 INFO アプリケーション開始");
        assert!(chunks[2].starts_with("2024-08-30 10:02:30 ERROR"));
        assert!(chunks[2].ends_with("at app.run(main.rs:10)"));
        assert!(chunks[3].starts_with("2024/08/30"));
    }

    #[test]
    fn test_chunks_reconstruct_content() {
        let content = format!("preamble line\n{}\ntrailing\n", SAMPLE);
        let chunks = chunker().split(&content);
        assert_eq!(chunks.join("\n"), content);
        // Leading lines without a timestamp stay in their own chunk
        assert_eq!(chunks[0], "preamble line");
    }

    #[test]
    fn test_no_boundaries_single_chunk() {
        let content = "plain line one\nplain line two";
        let chunks = chunker().split(content);
        assert_eq!(chunks, vec![content.to_string()]);
    }

    #[test]
    fn test_oversized_chunk_is_resplit() {
        let content = "x".repeat(2000);
        let chunks = chunker().split(&content);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 800);
        assert_eq!(chunks[1].len(), 800);
        assert_eq!(chunks[2].len(), 400);
        assert_eq!(chunks.concat(), content);
    }

    #[test]
    fn test_chunk_at_limit_passes_through() {
        let content = "y".repeat(1000);
        let chunks = chunker().split(&content);
        assert_eq!(chunks, vec![content]);
    }

    #[test]
    fn test_resplit_counts_characters() {
        let content = "ログ".repeat(600);
        let chunks = chunker().split(&content);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 800);
        assert_eq!(chunks[1].chars().count(), 400);
    }

    #[test]
    fn test_no_chunk_exceeds_limit() {
        let mut content = String::new();
        for i in 0..50 {
            content.push_str(&format!("2024-08-30 10:{:02}:00 INFO event {}\n", i % 60, i));
            content.push_str(&"detail ".repeat(i * 5));
            content.push('\n');
        }
        for chunk in chunker().split(&content) {
            assert!(chunk.chars().count() <= 1000);
        }
    }

    #[test]
    fn test_custom_boundary_pattern() {
        let config = ChunkingConfig {
            boundary_patterns: vec![r"^\[\w+\]".to_string()],
            ..ChunkingConfig::default()
        };
        let chunker = LogChunker::new(&config).unwrap();
        let chunks = chunker.split("[a] one\ncontinued\n[b] two");
        assert_eq!(chunks, vec!["[a] one\ncontinued", "[b] two"]);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let config = ChunkingConfig {
            boundary_patterns: vec!["(".to_string()],
            ..ChunkingConfig::default()
        };
        assert!(LogChunker::new(&config).is_err());
    }
}
