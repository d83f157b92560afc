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

use std::sync::Arc;

/// Maps text to a fixed-length vector.
///
/// Implementations must be deterministic: the same text and dimension always
/// produce the same vector. A learned embedding model can be plugged in here
/// without touching the index or the analyzer.
pub trait TextEncoder: Send + Sync {
    fn encode(&self, text: &str, dimension: usize) -> Vec<f32>;
}

/// Positional character-code accumulator.
///
/// Adds `code_point / 1000` of the character at position `i` into slot `i`,
/// stopping after `dimension` characters. This is not a semantic embedding.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalHashEncoder;

impl TextEncoder for PositionalHashEncoder {
    fn encode(&self, text: &str, dimension: usize) -> Vec<f32> {
        let mut vector = vec![0.0f32; dimension];
        if dimension == 0 {
            return vector;
        }

        for (i, ch) in text.chars().enumerate() {
            if i >= dimension {
                break;
            }
            vector[i % dimension] += ch as u32 as f32 / 1000.0;
        }

        vector
    }
}

/// Encoder used when none is configured
pub fn default_encoder() -> Arc<dyn TextEncoder> {
    Arc::new(PositionalHashEncoder)
}

/// Truncate text to `max_chars` characters, appending "..." when cut
pub fn truncate_display(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}
