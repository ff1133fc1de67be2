//! Exporting the installed package back into the library
//!
//! A machine in a known-good state can seed the library for the next one.
//! The exported package lands where resolution will find it:
//!
//! ```text
//! <library>/<VEN>_<DEV>/[SUBSYS_<subsys>/]<driver-version>-exported
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants::library as layout;
use crate::error::DriverKitError;
use crate::host::PackageExporter;
use crate::identifier::DeviceSignature;
use crate::library::DriverLibrary;

/// Folder name for an exported package of `driver_version`
///
/// Spaces become underscores; an unknown version is spelled `unknown`.
pub fn export_folder_name(driver_version: Option<&str>) -> String {
    let version = driver_version
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(layout::UNKNOWN_VERSION);
    format!("{}{}", version.replace(' ', "_"), layout::EXPORT_SUFFIX)
}

/// Library location an export for this device should be written to
///
/// Returns `None` when vendor or device is unknown, since the package could
/// never be matched from anywhere else.
pub fn export_destination(
    library: &DriverLibrary,
    signature: &DeviceSignature,
    driver_version: Option<&str>,
) -> Option<PathBuf> {
    let vendor_device_dir = library
        .find_vendor_device_dir(signature)
        .or_else(|| library.vendor_device_path(signature))?;

    let parent = match signature.subsystem.as_deref() {
        Some(subsystem) => DriverLibrary::subsystem_path(&vendor_device_dir, subsystem),
        None => vendor_device_dir,
    };

    Some(parent.join(export_folder_name(driver_version)))
}

/// Export the currently installed package to `destination`
///
/// Without a current descriptor name there is nothing to export: the call
/// returns `false` and touches nothing. Parent directories are created.
pub fn export_current_package(
    exporter: &dyn PackageExporter,
    destination: &Path,
    current_descriptor: Option<&str>,
) -> bool {
    let Some(descriptor) = current_descriptor.filter(|d| !d.trim().is_empty()) else {
        warn!("No current descriptor name detected; skipping driver export");
        return false;
    };

    if let Err(source) = fs::create_dir_all(destination) {
        let err = DriverKitError::CreateDir {
            path: destination.to_path_buf(),
            source,
        };
        warn!(error = %err, "Cannot prepare export destination");
        return false;
    }

    info!(descriptor, destination = ?destination, "Exporting current display driver package");
    match exporter.export_package(descriptor, destination) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Driver export failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MockPackageExporter;
    use mockall::predicate::eq;
    use tempfile::TempDir;

    #[test]
    fn test_export_folder_name() {
        assert_eq!(export_folder_name(Some("31.0.101.4502")), "31.0.101.4502-exported");
        assert_eq!(export_folder_name(Some("31.0 beta 2")), "31.0_beta_2-exported");
        assert_eq!(export_folder_name(None), "unknown-exported");
        assert_eq!(export_folder_name(Some("  ")), "unknown-exported");
    }

    #[test]
    fn test_export_destination_layout() {
        let tmp = TempDir::new().unwrap();
        let library = DriverLibrary::new(tmp.path());

        let full = DeviceSignature::new(Some("8086"), Some("8A56"), Some("86AB103C"));
        assert_eq!(
            export_destination(&library, &full, Some("30.0.101.1340")),
            Some(tmp.path().join("8086_8A56/SUBSYS_86AB103C/30.0.101.1340-exported"))
        );

        let no_subsys = DeviceSignature::new(Some("8086"), Some("8A56"), None);
        assert_eq!(
            export_destination(&library, &no_subsys, None),
            Some(tmp.path().join("8086_8A56/unknown-exported"))
        );

        let unknown = DeviceSignature::new(None, Some("8A56"), None);
        assert_eq!(export_destination(&library, &unknown, None), None);
    }

    #[test]
    fn test_export_destination_follows_existing_alias() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("VEN_8086_8A56")).unwrap();
        let library = DriverLibrary::new(tmp.path());

        let sig = DeviceSignature::new(Some("8086"), Some("8A56"), None);
        assert_eq!(
            export_destination(&library, &sig, Some("1.0")),
            Some(tmp.path().join("VEN_8086_8A56/1.0-exported"))
        );
    }

    #[test]
    fn test_export_without_descriptor_is_noop() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("8086_8A56/1.0-exported");

        let mut exporter = MockPackageExporter::new();
        exporter.expect_export_package().never();

        assert!(!export_current_package(&exporter, &dest, None));
        assert!(!export_current_package(&exporter, &dest, Some("")));
        assert!(!dest.exists());
    }

    #[test]
    fn test_export_creates_parents_and_delegates() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("8086_8A56/SUBSYS_86AB103C/1.0-exported");

        let mut exporter = MockPackageExporter::new();
        exporter
            .expect_export_package()
            .with(eq("oem42.inf"), eq(dest.clone()))
            .times(1)
            .returning(|_, _| Ok(()));

        assert!(export_current_package(&exporter, &dest, Some("oem42.inf")));
        assert!(dest.is_dir());
    }

    #[test]
    fn test_export_failure_reported() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out");

        let mut exporter = MockPackageExporter::new();
        exporter
            .expect_export_package()
            .returning(|name, dest| {
                Err(DriverKitError::Export {
                    package: name.to_string(),
                    destination: dest.to_path_buf(),
                    reason: "access denied".to_string(),
                })
            });

        assert!(!export_current_package(&exporter, &dest, Some("oem42.inf")));
    }
}
