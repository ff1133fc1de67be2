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

use clap::Parser;
use tracing::info;

use dk_core::constants::exit_code;
use drvkit::cli::Cli;
use drvkit::{commands, logger};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match commands::load(&cli.global) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(exit_code::CONFIG_FAILED);
        }
    };

    let log = logger::init_logging(Some(&settings.log_path()));
    info!(version = env!("CARGO_PKG_VERSION"), "drvkit starting");
    if let Some(log) = &log {
        info!(log = ?log.path, "Logging to file");
    }

    let code = commands::execute(cli.command.unwrap_or_default(), &settings)?;

    // Flush the log file; process::exit skips destructors
    drop(log);
    if code != exit_code::SUCCESS {
        std::process::exit(code);
    }
    Ok(())
}
