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
use clap::Parser;

mod analysis;
mod cli;
mod commands;
mod config;
mod embedding;
mod index;
mod knowledge;
mod llm;
mod logging;
mod logs;
mod storage;

use cli::Cli;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let log_guard = logging::init_logging(&config.logging, cli.log_file)?;

    // Execute the command
    if let Err(e) = commands::execute(&config, cli.command, cli.snapshot_dir).await {
        eprintln!("Error: {}", e);
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}
