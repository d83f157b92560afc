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

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lograg")]
#[command(version, author = "Muvon Un Limited <opensource@muvon.io>")]
#[command(about = "Retrieval-augmented log analysis with a problem/solution knowledge base", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to config.toml in the storage directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding index snapshots (defaults to <storage>/index)
    #[arg(long, global = true)]
    pub snapshot_dir: Option<PathBuf>,

    /// Also write JSON logs to a daily rotated file
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index a log file or directory and save a new snapshot
    Load {
        /// Log file or directory to load
        path: PathBuf,

        /// File name pattern used for directories (defaults to [logs] file_pattern)
        #[arg(short, long)]
        pattern: Option<String>,
    },

    /// Summarize indexed logs for a free-form request
    Analyze {
        /// What to look for (defaults to [requests] default)
        request: Option<String>,

        /// Extra log file or directory indexed for this run only
        #[arg(short, long)]
        logs: Option<PathBuf>,
    },

    /// Analyze errors and exceptions, with causes and remedies
    Errors {
        /// Extra log file or directory indexed for this run only
        #[arg(short, long)]
        logs: Option<PathBuf>,
    },

    /// Analyze performance and processing time problems
    Performance {
        /// Extra log file or directory indexed for this run only
        #[arg(short, long)]
        logs: Option<PathBuf>,
    },

    /// Summarize the log flow in time order
    Timeline {
        /// Extra log file or directory indexed for this run only
        #[arg(short, long)]
        logs: Option<PathBuf>,
    },

    /// Nearest-neighbour search over indexed log chunks
    Search {
        /// Free text to search for
        query: String,

        /// Number of results
        #[arg(short, long, default_value = "10")]
        k: usize,
    },

    /// Problem/solution knowledge base
    Solutions {
        #[command(subcommand)]
        command: SolutionsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum SolutionsCommand {
    /// Find solutions matching any of the keywords
    Search {
        /// Keywords to look for
        #[arg(required = true)]
        keywords: Vec<String>,

        /// Only consider entries in this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show the solution for a problem name
    Get {
        /// Problem name (case-insensitive)
        name: String,
    },

    /// Add a solution and save the knowledge base
    Add {
        /// Problem name
        #[arg(short, long)]
        name: String,

        /// Category
        #[arg(short, long)]
        category: String,

        /// Remedy
        #[arg(short, long)]
        solution: String,

        /// Detailed description
        #[arg(short, long, default_value = "")]
        details: String,

        /// Prevention measures
        #[arg(short, long, default_value = "")]
        prevention: String,

        /// Reference material
        #[arg(short, long, default_value = "")]
        reference: String,
    },

    /// List known categories
    Categories,
}
