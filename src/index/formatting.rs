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

use crate::index::types::QueryResult;

pub fn format_query_results(results: &[QueryResult]) -> String {
    if results.is_empty() {
        return "No results found".to_string();
    }

    let mut output = String::new();

    for (rank, result) in results.iter().enumerate() {
        output.push_str(&"━".repeat(60));
        output.push('\n');

        output.push_str(
            &format!("#{} (entry {})", rank + 1, result.source_index)
                .blue()
                .bold()
                .to_string(),
        );
        output.push('\n');

        output.push_str(&result.text);
        output.push('\n');

        output.push_str(
            &format!("distance {:.2}", result.distance)
                .green()
                .to_string(),
        );
        output.push_str("\n\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_empty() {
        assert_eq!(format_query_results(&[]), "No results found");
    }

    #[test]
    fn test_format_includes_text_and_distance() {
        colored::control::set_override(false);
        let results = vec![QueryResult {
            text: "ERROR timeout".to_string(),
            distance: 1.234,
            source_index: 7,
        }];
        let output = format_query_results(&results);
        assert!(output.contains("#1 (entry 7)"));
        assert!(output.contains("ERROR timeout"));
        assert!(output.contains("distance 1.23"));
    }
}
