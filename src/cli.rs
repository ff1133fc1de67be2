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

//! Command Line Interface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "drvkit")]
#[command(version)]
#[command(about = "drvkit - known-good display driver installer")]
#[command(long_about = "drvkit - known-good display driver installer

Detects the display adapter, picks the matching package from the local
driver library, installs it and blocks automatic driver replacement.

EXAMPLES:
    drvkit                                  Full run (same as `drvkit run`)
    drvkit run --dry-run                    Resolve and report, change nothing
    drvkit run --auto                       Take the newest version without asking
    drvkit inspect                          Print the system inventory as JSON
    drvkit resolve --id 'PCI\\VEN_8086&DEV_8A56&SUBSYS_86AB103C'
    drvkit export                           Export the installed package
    drvkit block-updates                    Only apply update suppression

ENVIRONMENT VARIABLES:
    RUST_LOG=debug         Enable debug logging
    DRVKIT_ROOT            Toolkit root (default: executable directory)
    DRVKIT_LIBRARY         Driver library directory

FILES:
    <root>/drvkit.json     Settings
    <root>/Drivers/Intel   Driver library
    <root>/Logs            One log file per run")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Settings file (default: <root>/drvkit.json)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Driver library directory, overriding settings
    #[arg(long, global = true, value_name = "DIR")]
    pub library: Option<PathBuf>,

    /// Log directory, overriding settings
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Detect, resolve, install, block updates and export (default)
    Run {
        /// Resolve and report only
        #[arg(long)]
        dry_run: bool,

        /// Never prompt; take the newest matching version
        #[arg(long)]
        auto: bool,
    },

    /// Print the system inventory as JSON
    Inspect,

    /// Resolve hardware IDs against the library and print the result as JSON
    Resolve {
        /// Hardware ID, most specific first (repeatable)
        #[arg(long = "id", value_name = "HWID", required = true)]
        ids: Vec<String>,

        /// Never prompt; take the newest matching version
        #[arg(long)]
        auto: bool,
    },

    /// Export the currently installed display package into the library
    Export,

    /// Apply automatic driver update suppression only
    BlockUpdates,
}

impl Default for Commands {
    fn default() -> Self {
        Self::Run {
            dry_run: false,
            auto: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["drvkit"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(
            cli.command.unwrap_or_default(),
            Commands::Run { dry_run: false, auto: false }
        ));
    }

    #[test]
    fn test_run_flags_and_globals() {
        let cli = Cli::try_parse_from(["drvkit", "run", "--dry-run", "--auto", "--library", "/srv/lib"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Run { dry_run: true, auto: true })));
        assert_eq!(cli.global.library, Some(PathBuf::from("/srv/lib")));
    }

    #[test]
    fn test_resolve_collects_ids() {
        let cli = Cli::try_parse_from([
            "drvkit",
            "resolve",
            "--id",
            "PCI\\VEN_8086&DEV_8A56&SUBSYS_86AB103C",
            "--id",
            "PCI\\VEN_8086&DEV_8A56",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Resolve { ids, auto }) => {
                assert_eq!(ids.len(), 2);
                assert!(!auto);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_requires_an_id() {
        assert!(Cli::try_parse_from(["drvkit", "resolve"]).is_err());
    }
}
