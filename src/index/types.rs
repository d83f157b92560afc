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

use serde::{Deserialize, Serialize};

/// A nearest-neighbour hit
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Stored text, shortened for display
    pub text: String,
    /// Squared Euclidean distance, smaller is closer
    pub distance: f32,
    /// Position of the entry in insertion order
    pub source_index: usize,
}

/// On-disk layout of the binary index file
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct IndexFile {
    pub version: u32,
    pub dimension: usize,
    pub vectors: Vec<Vec<f32>>,
}

pub(crate) const INDEX_FILE_VERSION: u32 = 1;
