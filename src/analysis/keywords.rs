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

use std::collections::BTreeSet;

use crate::config::KnowledgeConfig;

/// Picks known problem terms out of log chunks and the user request
pub struct KeywordExtractor {
    log_keywords: Vec<String>,
    request_keywords: Vec<String>,
}

impl KeywordExtractor {
    pub fn new(config: &KnowledgeConfig) -> Self {
        Self {
            log_keywords: lowercase_all(&config.log_keywords),
            request_keywords: lowercase_all(&config.request_keywords),
        }
    }

    /// Vocabulary terms occurring (case-insensitively) in any chunk or in the request
    pub fn extract<'a, I>(&self, chunks: I, request: &str) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut keywords = BTreeSet::new();

        for chunk in chunks {
            let text = chunk.to_lowercase();
            for keyword in &self.log_keywords {
                if text.contains(keyword.as_str()) {
                    keywords.insert(keyword.clone());
                }
            }
        }

        let request = request.to_lowercase();
        for keyword in &self.request_keywords {
            if request.contains(keyword.as_str()) {
                keywords.insert(keyword.clone());
            }
        }

        keywords
    }
}

fn lowercase_all(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> KeywordExtractor {
        KeywordExtractor::new(&KnowledgeConfig::default())
    }

    #[test]
    fn test_extract_from_chunks() {
        let keywords = extractor().extract(
            ["2024-08-30 10:02:30 ERROR データベース接続エラー: Connection timeout"],
            "",
        );
        let expected: BTreeSet<String> = ["error", "データベース", "接続", "エラー", "connection", "timeout"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(keywords, expected);
    }

    #[test]
    fn test_extract_from_request_uses_request_vocabulary() {
        let keywords = extractor().extract(std::iter::empty(), "Performance とデータベース");
        // "データベース" is only looked up in log chunks
        assert_eq!(keywords.len(), 1);
        assert!(keywords.contains("performance"));
    }

    #[test]
    fn test_extract_deduplicates() {
        let keywords = extractor().extract(["disk full", "DISK slow"], "disk");
        assert_eq!(keywords.into_iter().collect::<Vec<_>>(), vec!["disk"]);
    }

    #[test]
    fn test_custom_vocabulary() {
        let config = KnowledgeConfig {
            log_keywords: vec!["Kafka".to_string()],
            request_keywords: vec![],
            ..KnowledgeConfig::default()
        };
        let keywords = KeywordExtractor::new(&config).extract(["kafka lag"], "error");
        assert_eq!(keywords.into_iter().collect::<Vec<_>>(), vec!["kafka"]);
    }
}
