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

use colored::Colorize;

use crate::knowledge::store::KnowledgeBase;
use crate::knowledge::types::{KnowledgeEntry, KnowledgeMatch};

pub const NOT_FOUND_MESSAGE: &str = "該当する解決策が見つかりませんでした。";
const MISSING_FIELD: &str = "N/A";

impl KnowledgeBase {
    /// Render an entry as a fixed six-field block
    pub fn format(&self, entry: Option<&KnowledgeEntry>) -> String {
        let Some(entry) = entry else {
            return NOT_FOUND_MESSAGE.to_string();
        };

        let columns = self.columns();
        let field = |header: &str| entry.get(header).unwrap_or(MISSING_FIELD).to_string();

        [
            format!("【問題】: {}", field(&columns.problem_name)),
            format!("【カテゴリ】: {}", field(&columns.category)),
            format!("【対処法】: {}", field(&columns.solution)),
            format!("【詳細説明】: {}", field(&columns.details)),
            format!("【予防策】: {}", field(&columns.prevention)),
            format!("【参考情報】: {}", field(&columns.reference)),
        ]
        .join("\n")
    }

    /// Numbered list of the first `limit` matches, as used in prompts
    pub fn format_numbered(&self, matches: &[KnowledgeMatch], limit: usize) -> String {
        matches
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, m)| format!("{}. {}\n", i + 1, self.format(Some(&m.entry))))
            .collect()
    }
}

/// Terminal rendering of search matches
pub fn format_matches(kb: &KnowledgeBase, matches: &[KnowledgeMatch]) -> String {
    if matches.is_empty() {
        return NOT_FOUND_MESSAGE.to_string();
    }

    let mut output = String::new();
    for m in matches {
        output.push_str(&"━".repeat(60));
        output.push('\n');
        output.push_str(&kb.format(Some(&m.entry)));
        output.push('\n');
        output.push_str(&format!("score {}", m.match_score).green().to_string());
        output.push_str("\n\n");
    }
    output
}

pub fn format_categories(categories: &[String]) -> String {
    if categories.is_empty() {
        return "No categories".to_string();
    }

    let mut output = String::new();
    output.push_str(&"Categories".bold().to_string());
    output.push('\n');
    for category in categories {
        output.push_str(&format!("  - {}\n", category));
    }
    output
}
