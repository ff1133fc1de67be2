//! Driver store operations through `pnputil`

use dk_core::{PackageExporter, PackageInstaller};
use dk_error::DriverKitError;
use std::path::Path;
use tracing::{info, warn};

use crate::command::{run_logged, CommandRunner, SystemRunner};

pub const PNPUTIL: &str = "pnputil";

/// pnputil: package installed, reboot needed to finish
pub const REBOOT_REQUIRED: i32 = 3010;

/// Installs and exports packages with the driver store utility
#[derive(Debug, Clone, Default)]
pub struct PnpUtil<R = SystemRunner> {
    runner: R,
}

impl PnpUtil<SystemRunner> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: CommandRunner> PnpUtil<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }
}

pub fn install_args(descriptor: &Path) -> Vec<String> {
    vec![
        "/add-driver".to_string(),
        descriptor.display().to_string(),
        "/install".to_string(),
    ]
}

pub fn export_args(descriptor_name: &str, destination: &Path) -> Vec<String> {
    vec![
        "/export-driver".to_string(),
        descriptor_name.to_string(),
        destination.display().to_string(),
    ]
}

impl<R: CommandRunner> PackageInstaller for PnpUtil<R> {
    fn install(&self, descriptor: &Path) -> dk_core::Result<()> {
        info!(descriptor = ?descriptor, "Installing driver package");
        let output = run_logged(&self.runner, PNPUTIL, &install_args(descriptor))?;

        match output.code {
            Some(0) => Ok(()),
            Some(REBOOT_REQUIRED) => {
                warn!("Driver installed; a reboot is required to finish");
                Ok(())
            }
            code => Err(DriverKitError::Installation {
                descriptor: descriptor.to_path_buf(),
                code,
            }),
        }
    }
}

impl<R: CommandRunner> PackageExporter for PnpUtil<R> {
    fn export_package(&self, descriptor_name: &str, destination: &Path) -> dk_core::Result<()> {
        let output = run_logged(&self.runner, PNPUTIL, &export_args(descriptor_name, destination))?;
        if output.success() {
            Ok(())
        } else {
            Err(DriverKitError::Export {
                package: descriptor_name.to_string(),
                destination: destination.to_path_buf(),
                reason: format!("{} exited with code {:?}", PNPUTIL, output.code),
            })
        }
    }
}
