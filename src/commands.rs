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

use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::analysis::LogAnalyzer;
use crate::cli::{Commands, SolutionsCommand};
use crate::config::Config;
use crate::index::formatting::format_query_results;
use crate::knowledge::formatting::{format_categories, format_matches};
use crate::knowledge::SolutionRecord;

/// Run one CLI command against the analyzer built from `config`
pub async fn execute(config: &Config, command: Commands, snapshot_dir: Option<PathBuf>) -> Result<()> {
    let snapshot_dir = match snapshot_dir {
        Some(dir) => dir,
        None => crate::storage::get_snapshot_dir()?,
    };

    let mut analyzer = LogAnalyzer::new(config)?;

    match command {
        Commands::Load { path, pattern } => {
            analyzer.open_index(&snapshot_dir)?;
            let before = analyzer.index().len();

            if !analyzer.load_path(&path, pattern.as_deref()) {
                anyhow::bail!("No logs could be loaded from {}", path.display());
            }

            let added = analyzer.index().len() - before;
            match analyzer.save_index(&snapshot_dir)? {
                Some(dir) => println!(
                    "{} {} chunks ({} total) saved to {}",
                    "✓".green(),
                    added,
                    analyzer.index().len(),
                    dir.display()
                ),
                None => println!("Nothing to save"),
            }
        }
        Commands::Analyze { request, logs } => {
            prepare_index(&mut analyzer, &snapshot_dir, logs.as_deref())?;
            let summary = match request {
                Some(request) => analyzer.summarize_logs(&request).await?,
                None => analyzer.summarize_default().await?,
            };
            print_summary(&summary);
        }
        Commands::Errors { logs } => {
            prepare_index(&mut analyzer, &snapshot_dir, logs.as_deref())?;
            print_summary(&analyzer.analyze_errors().await?);
        }
        Commands::Performance { logs } => {
            prepare_index(&mut analyzer, &snapshot_dir, logs.as_deref())?;
            print_summary(&analyzer.analyze_performance().await?);
        }
        Commands::Timeline { logs } => {
            prepare_index(&mut analyzer, &snapshot_dir, logs.as_deref())?;
            print_summary(&analyzer.timeline_summary().await?);
        }
        Commands::Search { query, k } => {
            analyzer.open_index(&snapshot_dir)?;
            println!("{}", format_query_results(&analyzer.search_logs(&query, Some(k))));
        }
        Commands::Solutions { command } => execute_solutions(&mut analyzer, command)?,
    }

    Ok(())
}

fn execute_solutions(analyzer: &mut LogAnalyzer, command: SolutionsCommand) -> Result<()> {
    match command {
        SolutionsCommand::Search { keywords, category } => {
            let matches = analyzer.find_solutions(&keywords, category.as_deref());
            println!("{}", format_matches(analyzer.knowledge(), &matches));
        }
        SolutionsCommand::Get { name } => {
            println!("{}", analyzer.get_solution(&name));
        }
        SolutionsCommand::Add {
            name,
            category,
            solution,
            details,
            prevention,
            reference,
        } => {
            let message = analyzer.add_new_solution(SolutionRecord {
                problem_name: name,
                category,
                solution,
                details,
                prevention,
                reference,
            });
            if !analyzer.save_knowledge_base(None) {
                anyhow::bail!("Failed to save knowledge base");
            }
            println!("{} {}", "✓".green(), message);
        }
        SolutionsCommand::Categories => {
            println!("{}", format_categories(&analyzer.categories()));
        }
    }

    Ok(())
}

/// Restore the latest snapshot and index extra logs for this run
fn prepare_index(analyzer: &mut LogAnalyzer, snapshot_dir: &Path, logs: Option<&Path>) -> Result<()> {
    analyzer.open_index(snapshot_dir)?;
    if let Some(logs) = logs {
        if !analyzer.load_path(logs, None) {
            anyhow::bail!("No logs could be loaded from {}", logs.display());
        }
    }
    Ok(())
}

fn print_summary(summary: &str) {
    println!("{}", "━".repeat(60));
    println!("{}", summary);
    println!("{}", "━".repeat(60));
}
