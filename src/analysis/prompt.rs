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

use crate::index::QueryResult;
use crate::llm::ChatMessage;

/// Numbered log excerpts with their distance to the request
pub fn build_context(results: &[QueryResult], limit: usize) -> String {
    results
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, r)| format!("ログエントリ {} (距離: {:.2}):\n{}", i + 1, r.distance, r.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Final instruction handed to the generation backend.
/// `knowledge` is the rendered list of matching solutions, if any.
pub fn build_prompt(user_request: &str, context: &str, knowledge: Option<&str>) -> String {
    let knowledge_block = knowledge
        .filter(|k| !k.is_empty())
        .map(|k| format!("\n\n【関連する対策情報】:\n{}", k))
        .unwrap_or_default();

    format!(
        "以下のログエントリとナレッジベースに基づいて、ユーザーの要求に答えてください。\n\
         \n\
         ユーザーの要求: {user_request}\n\
         \n\
         関連するログエントリ:\n\
         {context}{knowledge_block}\n\
         \n\
         上記の情報を分析して、ユーザーの要求に適した要約を提供してください。\n\
         エラーや問題がある場合は重要度を示し、時系列や原因分析、具体的な対策を含めてください。\n\
         ナレッジベースの対策情報がある場合は、それを参考にして実用的な解決案を提示してください。"
    )
}

/// System prompt, optional custom instruction, then the prompt itself
pub fn build_messages(system_prompt: &str, custom_prompt: &str, prompt: String) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(system_prompt)];
    if !custom_prompt.is_empty() {
        messages.push(ChatMessage::user(custom_prompt));
    }
    messages.push(ChatMessage::user(prompt));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    fn result(text: &str, distance: f32, source_index: usize) -> QueryResult {
        QueryResult {
            text: text.to_string(),
            distance,
            source_index,
        }
    }

    #[test]
    fn test_build_context_limits_and_numbers() {
        let results: Vec<QueryResult> = (0..7)
            .map(|i| result(&format!("line {}", i), i as f32 * 1.5, i))
            .collect();
        let context = build_context(&results, 5);

        assert!(context.starts_with("ログエントリ 1 (距離: 0.00):\nline 0"));
        assert!(context.contains("ログエントリ 5 (距離: 6.00):\nline 4"));
        assert!(!context.contains("line 5"));
        assert_eq!(context.matches("\n\n").count(), 4);
    }

    #[test]
    fn test_build_prompt_without_knowledge() {
        let prompt = build_prompt("エラーを分析", "ctx", None);
        assert!(prompt.contains("ユーザーの要求: エラーを分析"));
        assert!(prompt.contains("関連するログエントリ:\nctx\n\n上記の情報"));
        assert!(!prompt.contains("【関連する対策情報】"));
    }

    #[test]
    fn test_build_prompt_with_knowledge() {
        let prompt = build_prompt("req", "ctx", Some("1. solution\n"));
        assert!(prompt.contains("ctx\n\n【関連する対策情報】:\n1. solution\n"));
    }

    #[test]
    fn test_build_messages() {
        let messages = build_messages("sys", "", "prompt".to_string());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);

        let messages = build_messages("sys", "custom", "prompt".to_string());
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].content, "custom");
        assert_eq!(messages[2].content, "prompt");
    }
}
