//! Driver library layout
//!
//! The library is a directory tree provisioned out of band:
//!
//! ```text
//! <root>/<VEN>_<DEV>/[SUBSYS_<8hex>/]<version-folder>/**/<descriptor>.inf
//! ```
//!
//! Directory naming is a persisted contract with externally provisioned
//! libraries. This module only reads the tree.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

use crate::constants::library as layout;
use crate::identifier::DeviceSignature;

/// One directory holding a complete driver package for one version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageVersionFolder {
    /// Directory name (the version label)
    pub name: String,
    /// Full path to the directory
    pub path: PathBuf,
    /// Last modification time, when the filesystem reports one
    #[serde(skip)]
    pub modified: Option<SystemTime>,
}

/// True for `SUBSYS_*` directories, which are structure rather than versions
pub fn is_subsystem_dir_name(name: &str) -> bool {
    name.get(..layout::SUBSYSTEM_DIR_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(layout::SUBSYSTEM_DIR_PREFIX))
}

/// Read-only view of a driver library rooted at a directory
#[derive(Debug, Clone)]
pub struct DriverLibrary {
    root: PathBuf,
}

impl DriverLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path the vendor/device directory has under the canonical naming
    ///
    /// This does not check existence; use [`Self::find_vendor_device_dir`] for lookup.
    pub fn vendor_device_path(&self, signature: &DeviceSignature) -> Option<PathBuf> {
        signature.vendor_device_key().map(|key| self.root.join(key))
    }

    /// Locate the existing vendor/device directory for a signature
    ///
    /// `<VEN>_<DEV>` is tried first, then the `VEN_<VEN>_<DEV>` spelling.
    pub fn find_vendor_device_dir(&self, signature: &DeviceSignature) -> Option<PathBuf> {
        let key = signature.vendor_device_key()?;

        let canonical = self.root.join(&key);
        if canonical.is_dir() {
            return Some(canonical);
        }

        let alias = self
            .root
            .join(format!("{}{}", layout::VENDOR_DIR_ALIAS_PREFIX, key));
        if alias.is_dir() {
            debug!(path = ?alias, "Using VEN_-prefixed vendor/device directory");
            return Some(alias);
        }

        None
    }

    /// Subsystem-scoped directory under a vendor/device directory
    pub fn subsystem_path(vendor_device_dir: &Path, subsystem: &str) -> PathBuf {
        vendor_device_dir.join(format!("{}{}", layout::SUBSYSTEM_DIR_PREFIX, subsystem))
    }

    /// Immediate child directories of `dir` that are package version folders
    ///
    /// `SUBSYS_*` directories are excluded. The result is sorted by name so
    /// callers see a stable order.
    pub fn version_folders(dir: &Path) -> io::Result<Vec<PackageVersionFolder>> {
        let mut folders = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if is_subsystem_dir_name(&name) {
                continue;
            }

            let modified = entry.metadata().and_then(|m| m.modified()).ok();
            folders.push(PackageVersionFolder { name, path, modified });
        }

        folders.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(folders)
    }
}
