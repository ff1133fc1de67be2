/*
 * This file is part of drvkit.
 *
 * Copyright (C) 2025 drvkit contributors
 *
 * drvkit is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * drvkit is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with drvkit. If not, see <https://www.gnu.org/licenses/>.
 */

//! Run logging: console plus one log file per run
//!
//! Console output goes to stderr so command output on stdout stays parseable.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use dk_core::constants::paths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "info";

/// `log-YYYYMMDD-HHMMSS.txt`
pub fn log_file_name(now: DateTime<Local>) -> String {
    format!("{}{}.txt", paths::LOG_FILE_PREFIX, now.format("%Y%m%d-%H%M%S"))
}

/// Appender writing this run's log file, creating the directory as needed
pub fn run_log_appender(log_dir: &Path, now: DateTime<Local>) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(log_file_name(now))
        .build(log_dir)
}

/// Keeps the file writer alive; drop it before exiting to flush the log
pub struct LogHandle {
    pub path: PathBuf,
    _guard: WorkerGuard,
}

/// Install the global subscriber
///
/// Returns a handle for the log file, or `None` when logging is console-only
/// because no directory was given or the file could not be opened.
pub fn init_logging(log_dir: Option<&Path>) -> Option<LogHandle> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let now = Local::now();
    let appender = log_dir.and_then(|dir| match run_log_appender(dir, now) {
        Ok(appender) => Some((dir.join(log_file_name(now)), appender)),
        Err(e) => {
            eprintln!("Cannot open log file in {}: {}; logging to console only", dir.display(), e);
            None
        }
    });

    let (handle, file_layer) = match appender {
        Some((path, appender)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(LogHandle { path, _guard: guard }),
                Some(
                    fmt::layer()
                        .with_ansi(false)
                        .with_target(false)
                        .with_writer(writer),
                ),
            )
        }
        None => (None, None),
    };

    let console_layer = fmt::layer().with_target(false).with_writer(io::stderr);

    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    handle
}
