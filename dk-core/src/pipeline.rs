//! One toolkit run
//!
//! A run is strictly sequential: inventory, signature extraction, resolution,
//! at most one install, then update suppression and export. Only an inventory
//! failure or an installation failure ends a run early; a missing match is
//! reported and the later phases still run.

use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::constants::exit_code;
use crate::error::DriverKitError;
use crate::export::{export_current_package, export_destination};
use crate::host::{PackageExporter, PackageInstaller, UpdateSuppressor};
use crate::identifier::DeviceSignature;
use crate::inventory::InventorySource;
use crate::resolver::{Resolution, Resolver};
use crate::selection::Disambiguator;

/// Run switches
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Resolve and report only; no install, policy change or export
    pub dry_run: bool,
    /// Export the current package into the library afterwards
    pub export_after_run: bool,
}

/// Everything a run talks to outside the core
pub struct Collaborators<'a> {
    pub inventory: &'a dyn InventorySource,
    pub installer: &'a dyn PackageInstaller,
    pub suppressor: &'a dyn UpdateSuppressor,
    pub exporter: &'a dyn PackageExporter,
    pub chooser: &'a dyn Disambiguator,
}

/// What a completed run did
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub gpu_name: Option<String>,
    pub signature: DeviceSignature,
    pub resolution: Resolution,
    /// A package was installed
    pub installed: bool,
    /// `None` when the phase was skipped
    pub updates_suppressed: Option<bool>,
    /// `None` when the phase was skipped
    pub exported: Option<bool>,
    pub export_destination: Option<PathBuf>,
}

/// Terminal outcome of a run
#[derive(Debug)]
pub enum RunOutcome {
    /// Installed a package, or there was nothing to install
    Completed(RunReport),
    /// No inventory record; resolution was never attempted
    InventoryFailed(DriverKitError),
    /// The installer rejected the resolved package
    InstallationFailed {
        report: RunReport,
        error: DriverKitError,
    },
}

impl RunOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed(_) => exit_code::SUCCESS,
            Self::InventoryFailed(_) => exit_code::INVENTORY_FAILED,
            Self::InstallationFailed { .. } => exit_code::INSTALLATION_FAILED,
        }
    }

    pub fn report(&self) -> Option<&RunReport> {
        match self {
            Self::Completed(report) | Self::InstallationFailed { report, .. } => Some(report),
            Self::InventoryFailed(_) => None,
        }
    }
}

/// Execute one run against the resolver's library
pub fn run(resolver: &Resolver, options: RunOptions, host: &Collaborators<'_>) -> RunOutcome {
    if options.dry_run {
        info!("=== DRY-RUN MODE ENABLED: No changes will be made ===");
    }

    let inventory = match host.inventory.collect() {
        Ok(inventory) => inventory,
        Err(e) => {
            error!(error = %e, "Failed to gather system info");
            return RunOutcome::InventoryFailed(e);
        }
    };

    let signature = inventory.signature();
    info!(
        gpu = inventory.gpu_name.as_deref().unwrap_or("unknown"),
        "Detected GPU: {}",
        signature
    );

    let resolution = resolver.resolve(&signature, host.chooser);

    let mut report = RunReport {
        gpu_name: inventory.gpu_name.clone(),
        signature,
        resolution,
        installed: false,
        updates_suppressed: None,
        exported: None,
        export_destination: None,
    };

    if let Resolution::Matched(package) = &report.resolution {
        if options.dry_run {
            info!(descriptor = ?package.descriptor, "DRY-RUN: Would install driver from this folder");
        } else {
            info!(descriptor = ?package.descriptor, "Installing driver");
            if let Err(e) = host.installer.install(&package.descriptor) {
                error!(
                    error = %e,
                    "Install failed. Try another version folder or verify the descriptor supports this hardware ID"
                );
                return RunOutcome::InstallationFailed { report, error: e };
            }
            report.installed = true;
        }
    } else if options.dry_run {
        info!("DRY-RUN: Would offer to export the current driver if this machine is in a good state");
    }

    if options.dry_run {
        info!("DRY-RUN: Skipping automatic update blocking and driver export");
        return RunOutcome::Completed(report);
    }

    info!("Blocking automatic driver delivery");
    let suppressed = host.suppressor.suppress_automatic_updates();
    if !suppressed {
        warn!("Some update-suppression steps failed");
    }
    report.updates_suppressed = Some(suppressed);

    if options.export_after_run {
        match export_destination(resolver.library(), &report.signature, inventory.driver_version()) {
            Some(destination) => {
                report.exported = Some(export_current_package(
                    host.exporter,
                    &destination,
                    inventory.current_descriptor.as_deref(),
                ));
                report.export_destination = Some(destination);
            }
            None => {
                warn!("Device vendor/device unknown; skipping driver export");
                report.exported = Some(false);
            }
        }
    }

    info!("Done.");
    RunOutcome::Completed(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPolicy;
    use crate::host::{MockPackageExporter, MockPackageInstaller, MockUpdateSuppressor};
    use crate::inventory::{MockInventorySource, SystemInventory};
    use crate::library::DriverLibrary;
    use crate::resolver::NoMatchReason;
    use crate::selection::NewestFirst;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn inventory() -> SystemInventory {
        SystemInventory {
            gpu_name: Some("Intel(R) UHD Graphics".to_string()),
            gpu_driver_version: Some("30.0.101.1340".to_string()),
            hardware_ids: vec!["PCI\\VEN_8086&DEV_8A56&SUBSYS_86AB103C&REV_0C".to_string()],
            current_descriptor: Some("oem42.inf".to_string()),
            ..Default::default()
        }
    }

    fn library_with_package(root: &Path) -> PathBuf {
        let folder = root.join("8086_8A56/SUBSYS_86AB103C/31.0.101.4502");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("iigd_dch.inf"), "[Version]\n").unwrap();
        folder.join("iigd_dch.inf")
    }

    fn resolver(root: &Path) -> Resolver {
        Resolver::new(DriverLibrary::new(root), DescriptorPolicy::default())
    }

    fn source_returning(inv: SystemInventory) -> MockInventorySource {
        let mut source = MockInventorySource::new();
        source.expect_collect().times(1).returning(move || Ok(inv.clone()));
        source
    }

    #[test]
    fn test_full_run_installs_blocks_and_exports() {
        let tmp = TempDir::new().unwrap();
        let descriptor = library_with_package(tmp.path());

        let inventory = source_returning(inventory());
        let mut installer = MockPackageInstaller::new();
        installer
            .expect_install()
            .withf(move |d| d == descriptor.as_path())
            .times(1)
            .returning(|_| Ok(()));
        let mut suppressor = MockUpdateSuppressor::new();
        suppressor.expect_suppress_automatic_updates().times(1).return_const(true);
        let mut exporter = MockPackageExporter::new();
        exporter.expect_export_package().times(1).returning(|_, _| Ok(()));

        let outcome = run(
            &resolver(tmp.path()),
            RunOptions { dry_run: false, export_after_run: true },
            &Collaborators {
                inventory: &inventory,
                installer: &installer,
                suppressor: &suppressor,
                exporter: &exporter,
                chooser: &NewestFirst,
            },
        );

        assert_eq!(outcome.exit_code(), 0);
        let report = outcome.report().unwrap();
        assert!(report.installed);
        assert_eq!(report.updates_suppressed, Some(true));
        assert_eq!(report.exported, Some(true));
        assert_eq!(
            report.export_destination,
            Some(tmp.path().join("8086_8A56/SUBSYS_86AB103C/30.0.101.1340-exported"))
        );
    }

    #[test]
    fn test_inventory_failure_aborts() {
        let tmp = TempDir::new().unwrap();
        let mut inventory = MockInventorySource::new();
        inventory
            .expect_collect()
            .returning(|| Err(DriverKitError::inventory("powershell returned nothing")));
        let mut installer = MockPackageInstaller::new();
        installer.expect_install().never();
        let mut suppressor = MockUpdateSuppressor::new();
        suppressor.expect_suppress_automatic_updates().never();
        let mut exporter = MockPackageExporter::new();
        exporter.expect_export_package().never();

        let outcome = run(
            &resolver(tmp.path()),
            RunOptions::default(),
            &Collaborators {
                inventory: &inventory,
                installer: &installer,
                suppressor: &suppressor,
                exporter: &exporter,
                chooser: &NewestFirst,
            },
        );

        assert!(matches!(outcome, RunOutcome::InventoryFailed(_)));
        assert_eq!(outcome.exit_code(), 1);
        assert!(outcome.report().is_none());
    }

    #[test]
    fn test_installation_failure_is_terminal() {
        let tmp = TempDir::new().unwrap();
        library_with_package(tmp.path());

        let inventory = source_returning(inventory());
        let mut installer = MockPackageInstaller::new();
        installer.expect_install().times(1).returning(|d| {
            Err(DriverKitError::Installation {
                descriptor: d.to_path_buf(),
                code: Some(1),
            })
        });
        let mut suppressor = MockUpdateSuppressor::new();
        suppressor.expect_suppress_automatic_updates().never();
        let mut exporter = MockPackageExporter::new();
        exporter.expect_export_package().never();

        let outcome = run(
            &resolver(tmp.path()),
            RunOptions { dry_run: false, export_after_run: true },
            &Collaborators {
                inventory: &inventory,
                installer: &installer,
                suppressor: &suppressor,
                exporter: &exporter,
                chooser: &NewestFirst,
            },
        );

        assert_eq!(outcome.exit_code(), 3);
        assert!(!outcome.report().unwrap().installed);
    }

    #[test]
    fn test_no_match_still_suppresses_updates() {
        let tmp = TempDir::new().unwrap();

        let inventory = source_returning(inventory());
        let mut installer = MockPackageInstaller::new();
        installer.expect_install().never();
        let mut suppressor = MockUpdateSuppressor::new();
        suppressor.expect_suppress_automatic_updates().times(1).return_const(false);
        let mut exporter = MockPackageExporter::new();
        exporter.expect_export_package().never();

        let outcome = run(
            &resolver(tmp.path()),
            RunOptions { dry_run: false, export_after_run: false },
            &Collaborators {
                inventory: &inventory,
                installer: &installer,
                suppressor: &suppressor,
                exporter: &exporter,
                chooser: &NewestFirst,
            },
        );

        assert_eq!(outcome.exit_code(), 0);
        let report = outcome.report().unwrap();
        assert!(matches!(
            report.resolution.no_match_reason(),
            Some(NoMatchReason::LibraryPathMissing { .. })
        ));
        assert_eq!(report.updates_suppressed, Some(false));
        assert_eq!(report.exported, None);
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let tmp = TempDir::new().unwrap();
        library_with_package(tmp.path());

        let inventory = source_returning(inventory());
        let mut installer = MockPackageInstaller::new();
        installer.expect_install().never();
        let mut suppressor = MockUpdateSuppressor::new();
        suppressor.expect_suppress_automatic_updates().never();
        let mut exporter = MockPackageExporter::new();
        exporter.expect_export_package().never();

        let outcome = run(
            &resolver(tmp.path()),
            RunOptions { dry_run: true, export_after_run: true },
            &Collaborators {
                inventory: &inventory,
                installer: &installer,
                suppressor: &suppressor,
                exporter: &exporter,
                chooser: &NewestFirst,
            },
        );

        let report = outcome.report().unwrap();
        assert!(report.resolution.is_match());
        assert!(!report.installed);
        assert_eq!(report.updates_suppressed, None);
        assert_eq!(report.exported, None);
    }

    #[test]
    fn test_unknown_device_skips_export() {
        let tmp = TempDir::new().unwrap();
        let inv = SystemInventory {
            hardware_ids: Vec::new(),
            ..inventory()
        };

        let inventory = source_returning(inv);
        let installer = MockPackageInstaller::new();
        let mut suppressor = MockUpdateSuppressor::new();
        suppressor.expect_suppress_automatic_updates().return_const(true);
        let mut exporter = MockPackageExporter::new();
        exporter.expect_export_package().never();

        let outcome = run(
            &resolver(tmp.path()),
            RunOptions { dry_run: false, export_after_run: true },
            &Collaborators {
                inventory: &inventory,
                installer: &installer,
                suppressor: &suppressor,
                exporter: &exporter,
                chooser: &NewestFirst,
            },
        );

        let report = outcome.report().unwrap();
        assert_eq!(
            report.resolution.no_match_reason(),
            Some(&NoMatchReason::IncompleteSignature)
        );
        assert_eq!(report.exported, Some(false));
    }
}
