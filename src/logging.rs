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

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt::Layer, prelude::*, registry::Registry, EnvFilter};

use crate::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "lograg.log";

fn env_filter(debug_mode: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug_mode {
            EnvFilter::new("info,lograg=debug")
        } else {
            EnvFilter::new("lograg=info")
        }
    })
}

/// Initialize logging: human readable output on stderr, plus JSON lines in a
/// daily rotated file under the storage directory when `config.file` or
/// `force_file` is set.
///
/// stdout carries command results only. Keep the returned guard alive for
/// the lifetime of the process so buffered file output gets flushed.
pub fn init_logging(
    config: &LoggingConfig,
    force_file: bool,
) -> Result<Option<WorkerGuard>, anyhow::Error> {
    let console_layer = Layer::new()
        .with_writer(std::io::stderr)
        .with_target(false);

    if !(config.file || force_file) {
        Registry::default()
            .with(console_layer)
            .with(env_filter(config.debug))
            .init();
        return Ok(None);
    }

    let file_dir = crate::storage::get_log_dir()?;
    std::fs::create_dir_all(&file_dir)?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &file_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = Layer::new()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .json();

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .with(env_filter(config.debug))
        .init();

    info!(
        log_directory = %file_dir.display(),
        debug_mode = config.debug,
        "File logging initialized"
    );

    Ok(Some(guard))
}
