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
use tracing::{debug, error};

use crate::embedding::{default_encoder, truncate_display, TextEncoder};
use crate::index::types::QueryResult;

const DEFAULT_DISPLAY_CHARS: usize = 200;
const KEYWORD_SEARCH_LIMIT: usize = 10;

/// Append-only exact nearest-neighbour index over log chunks.
///
/// `vectors[i]` is the encoding of `texts[i]`; positions never change once
/// assigned. Distances are squared Euclidean over raw vectors.
pub struct VectorIndex {
    dimension: usize,
    pub(crate) vectors: Vec<Vec<f32>>,
    pub(crate) texts: Vec<String>,
    encoder: Arc<dyn TextEncoder>,
    display_chars: usize,
}

impl VectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self::with_encoder(dimension, default_encoder())
    }

    pub fn with_encoder(dimension: usize, encoder: Arc<dyn TextEncoder>) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
            texts: Vec::new(),
            encoder,
            display_chars: DEFAULT_DISPLAY_CHARS,
        }
    }

    /// Maximum characters of stored text shown in a query result
    pub fn with_display_chars(mut self, display_chars: usize) -> Self {
        self.display_chars = display_chars;
        self
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// Encode and append a text
    pub fn add(&mut self, text: &str) {
        let vector = self.encode(text);
        // Both pushes happen together so readers never see a half-added entry
        self.vectors.push(vector);
        self.texts.push(text.to_string());
    }

    /// Return the `k` nearest entries to `text`, closest first.
    /// Ties keep insertion order. `k` is clamped to the number of entries.
    pub fn query(&self, text: &str, k: usize) -> Vec<QueryResult> {
        if self.texts.is_empty() {
            return Vec::new();
        }

        if self.vectors.len() != self.texts.len() {
            error!(
                vectors = self.vectors.len(),
                texts = self.texts.len(),
                "Search error: index is inconsistent"
            );
            return Vec::new();
        }

        let query_vector = self.encode(text);
        let actual_k = k.min(self.texts.len());

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, squared_euclidean(&query_vector, v)))
            .collect();

        // sort_by is stable, equal distances stay in insertion order
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(actual_k);

        debug!(k = actual_k, total = self.texts.len(), "Vector query finished");

        scored
            .into_iter()
            .map(|(i, distance)| QueryResult {
                text: truncate_display(&self.texts[i], self.display_chars),
                distance,
                source_index: i,
            })
            .collect()
    }

    /// Vector search driven by a free-text keyword
    pub fn search_by_keyword(&self, keyword: &str) -> Vec<QueryResult> {
        self.query(keyword, KEYWORD_SEARCH_LIMIT)
    }

    fn encode(&self, text: &str) -> Vec<f32> {
        self.encoder.encode(text, self.dimension)
    }
}

fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_index_query() {
        let index = VectorIndex::new(16);
        assert!(index.query("anything", 5).is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn test_add_keeps_vectors_and_texts_parallel() {
        let mut index = VectorIndex::new(16);
        index.add("first");
        index.add("second");
        assert_eq!(index.len(), 2);
        assert_eq!(index.vectors.len(), index.texts.len());
        assert_eq!(index.vectors[0].len(), 16);
        assert_eq!(index.texts()[1], "second");
    }

    #[test]
    fn test_query_clamps_k() {
        let mut index = VectorIndex::new(16);
        index.add("alpha");
        index.add("beta");
        index.add("gamma");

        assert_eq!(index.query("alpha", 10).len(), 3);
        assert_eq!(index.query("alpha", 2).len(), 2);
        assert!(index.query("alpha", 0).is_empty());
    }

    #[test]
    fn test_query_orders_by_distance() {
        let mut index = VectorIndex::new(32);
        index.add("zzzzzzzzzz");
        index.add("hello world");
        index.add("hello there");

        let results = index.query("hello world", 3);
        assert_eq!(results[0].source_index, 1);
        assert_eq!(results[0].distance, 0.0);
        for pair in results.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut index = VectorIndex::new(8);
        index.add("same");
        index.add("other text");
        index.add("same");

        let results = index.query("same", 3);
        assert_eq!(results[0].source_index, 0);
        assert_eq!(results[1].source_index, 2);
        assert_eq!(results[0].distance, results[1].distance);
    }

    #[test]
    fn test_display_text_truncated_but_stored_text_intact() {
        let mut index = VectorIndex::new(16);
        let long = "a".repeat(250);
        index.add(&long);

        let results = index.query("a", 1);
        assert_eq!(results[0].text.chars().count(), 203);
        assert!(results[0].text.ends_with("..."));
        assert_eq!(index.texts()[0], long);
    }

    #[test]
    fn test_custom_display_chars() {
        let mut index = VectorIndex::new(16).with_display_chars(5);
        index.add("abcdefghij");
        assert_eq!(index.query("a", 1)[0].text, "abcde...");
    }

    #[test]
    fn test_search_by_keyword_limit() {
        let mut index = VectorIndex::new(8);
        for i in 0..15 {
            index.add(&format!("entry {}", i));
        }
        assert_eq!(index.search_by_keyword("entry").len(), 10);
    }

    #[test]
    fn test_custom_encoder() {
        struct LengthEncoder;
        impl TextEncoder for LengthEncoder {
            fn encode(&self, text: &str, dimension: usize) -> Vec<f32> {
                vec![text.len() as f32; dimension]
            }
        }

        let mut index = VectorIndex::with_encoder(2, Arc::new(LengthEncoder));
        index.add("aaaa");
        index.add("a");

        let results = index.query("b", 2);
        assert_eq!(results[0].source_index, 1);
        assert_eq!(results[1].distance, 18.0);
    }

    #[test]
    fn test_squared_euclidean() {
        assert_eq!(squared_euclidean(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
    }
}
