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

//! Subcommand handlers

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{error, info, warn};

use dk_core::constants::exit_code;
use dk_core::{
    export_current_package, export_destination, extract, load_settings, Collaborators, DeviceSignature,
    Disambiguator, InventorySource, NewestFirst, PackageExporter, Resolution, Resolver, RunOptions,
    SystemInventory, ToolkitSettings, UpdateSuppressor,
};
use dk_host::{PnpUtil, PowerShellInventory, RegistryPolicy};

use crate::cli::{Commands, GlobalArgs};
use crate::prompt::ConsoleChooser;

/// Load settings and apply command line overrides
pub fn load(global: &GlobalArgs) -> dk_core::Result<ToolkitSettings> {
    let mut settings = load_settings(global.config.as_deref())?;
    if let Some(library) = &global.library {
        settings.library_dir = library.clone();
    }
    if let Some(log_dir) = &global.log_dir {
        settings.log_dir = log_dir.clone();
    }
    Ok(settings)
}

/// Run a subcommand, returning the process exit code
pub fn execute(command: Commands, settings: &ToolkitSettings) -> Result<i32> {
    match command {
        Commands::Run { dry_run, auto } => Ok(run(settings, dry_run, auto)),
        Commands::Inspect => inspect(&PowerShellInventory::new()),
        Commands::Resolve { ids, auto } => {
            let console;
            let chooser: &dyn Disambiguator = if settings.interactive && !auto {
                console = ConsoleChooser::stdio();
                &console
            } else {
                &NewestFirst
            };
            let report = resolve_ids(&settings.resolver(), ids.as_slice(), chooser);
            write_json(&mut io::stdout().lock(), &report)?;
            Ok(exit_code::SUCCESS)
        }
        Commands::Export => {
            let destination = export_installed(&settings.resolver(), &PowerShellInventory::new(), &PnpUtil::new())?;
            println!("{}", destination.display());
            Ok(exit_code::SUCCESS)
        }
        Commands::BlockUpdates => Ok(block_updates(&RegistryPolicy::new())),
    }
}

fn run(settings: &ToolkitSettings, dry_run: bool, auto: bool) -> i32 {
    let resolver = settings.resolver();
    info!(library = ?resolver.library().root(), "Using driver library");

    let console;
    let chooser: &dyn Disambiguator = if settings.interactive && !auto {
        console = ConsoleChooser::stdio();
        &console
    } else {
        &NewestFirst
    };

    let inventory = PowerShellInventory::new();
    let pnputil = PnpUtil::new();
    let policy = RegistryPolicy::new();

    let outcome = dk_core::run(
        &resolver,
        RunOptions {
            dry_run,
            export_after_run: settings.export_after_run,
        },
        &Collaborators {
            inventory: &inventory,
            installer: &pnputil,
            suppressor: &policy,
            exporter: &pnputil,
            chooser,
        },
    );

    if let Some(report) = outcome.report() {
        match serde_json::to_string(report) {
            Ok(json) => info!(report = %json, "Run finished"),
            Err(e) => warn!(error = %e, "Cannot serialize run report"),
        }
    }
    outcome.exit_code()
}

fn inspect(source: &dyn InventorySource) -> Result<i32> {
    match source.collect() {
        Ok(inventory) => {
            let report = InspectReport {
                signature: inventory.signature(),
                inventory,
            };
            write_json(&mut io::stdout().lock(), &report)?;
            Ok(exit_code::SUCCESS)
        }
        Err(e) => {
            error!(error = %e, "Failed to gather system info");
            Ok(exit_code::INVENTORY_FAILED)
        }
    }
}

/// Pretty JSON followed by a newline; the only thing commands print to stdout
pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Output of `drvkit inspect`
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub inventory: SystemInventory,
    pub signature: DeviceSignature,
}

/// Output of `drvkit resolve`
#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub signature: DeviceSignature,
    pub resolution: Resolution,
}

/// Resolve caller-supplied hardware IDs without touching the system
pub fn resolve_ids<S: AsRef<str>>(resolver: &Resolver, ids: &[S], chooser: &dyn Disambiguator) -> ResolveReport {
    let signature = extract(ids.iter().map(|id| id.as_ref()));
    let resolution = resolver.resolve(&signature, chooser);
    ResolveReport { signature, resolution }
}

/// Export the installed display package next to its library entry
pub fn export_installed(
    resolver: &Resolver,
    source: &dyn InventorySource,
    exporter: &dyn PackageExporter,
) -> Result<PathBuf> {
    let inventory = source.collect().context("Failed to gather system info")?;
    let signature = inventory.signature();

    let Some(destination) = export_destination(resolver.library(), &signature, inventory.driver_version()) else {
        bail!("Device vendor/device unknown ({}); nothing to export", signature);
    };

    if !export_current_package(exporter, &destination, inventory.current_descriptor.as_deref()) {
        bail!("Driver export to {} failed", destination.display());
    }
    Ok(destination)
}

fn block_updates(suppressor: &dyn UpdateSuppressor) -> i32 {
    if !suppressor.suppress_automatic_updates() {
        warn!("Some update-suppression steps failed");
    }
    exit_code::SUCCESS
}
