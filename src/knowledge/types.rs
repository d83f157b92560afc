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

use std::collections::HashMap;

/// One problem/solution row, keyed by column header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeEntry {
    fields: HashMap<String, String>,
}

impl KnowledgeEntry {
    pub fn from_fields(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields.get(header).map(String::as_str)
    }

    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }
}

/// Search hit with the number of distinct keywords it contains
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeMatch {
    pub entry: KnowledgeEntry,
    pub match_score: usize,
}

/// Values for a new entry, one per logical column
#[derive(Debug, Clone, Default)]
pub struct SolutionRecord {
    pub problem_name: String,
    pub category: String,
    pub solution: String,
    pub details: String,
    pub prevention: String,
    pub reference: String,
}
