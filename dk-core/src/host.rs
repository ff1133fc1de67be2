//! Host collaborator interfaces
//!
//! The core decides *what* to install and where to export; these traits are
//! how it asks the host operating system to do it. `dk-host` provides the
//! command-line implementations.

use std::path::Path;

use crate::error::Result;

/// Installs a driver package from its descriptor file
#[cfg_attr(test, mockall::automock)]
pub trait PackageInstaller {
    /// `Err` means the installer reported failure; it is not retried
    fn install(&self, descriptor: &Path) -> Result<()>;
}

/// Stops the OS from replacing the installed driver automatically
#[cfg_attr(test, mockall::automock)]
pub trait UpdateSuppressor {
    /// Idempotent. Sub-step failures are tolerated and reported through the
    /// return value; they never abort a run.
    fn suppress_automatic_updates(&self) -> bool;
}

/// Copies an installed driver package out of the driver store
#[cfg_attr(test, mockall::automock)]
pub trait PackageExporter {
    /// Export the package installed under `descriptor_name` into `destination`
    ///
    /// `destination` already exists when this is called.
    fn export_package(&self, descriptor_name: &str, destination: &Path) -> Result<()>;
}
