//! Driver package resolution
//!
//! Resolution walks the library for a [`DeviceSignature`]:
//!
//! 1. `<VEN>_<DEV>` must exist, otherwise there is no match. There is no
//!    fallback across vendor/device directories.
//! 2. `SUBSYS_<subsys>` children are the candidates when that directory exists
//!    and is non-empty.
//! 3. Otherwise the version folders directly under `<VEN>_<DEV>` are the
//!    candidates. An absent subsystem directory and an empty one both fall back.
//! 4. One candidate is taken as-is; several go to the [`Disambiguator`].
//! 5. The chosen folder must contain a descriptor file.
//!
//! Resolution never fails with an error. Every way of not finding a package
//! is a [`NoMatchReason`] the caller can branch on and log.

use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::descriptor::DescriptorPolicy;
use crate::identifier::DeviceSignature;
use crate::library::{DriverLibrary, PackageVersionFolder};
use crate::selection::Disambiguator;

// ============================================================================
// Resolution Results
// ============================================================================

/// Library level the chosen candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateScope {
    /// `<VEN>_<DEV>/SUBSYS_<subsys>/<version>`
    Subsystem,
    /// `<VEN>_<DEV>/<version>`
    VendorDevice,
}

/// A package ready to hand to the installer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPackage {
    pub folder: PackageVersionFolder,
    pub descriptor: PathBuf,
    pub scope: CandidateScope,
}

/// Why resolution produced no package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NoMatchReason {
    /// Vendor or device code unknown; the library was not consulted
    IncompleteSignature,
    /// No vendor/device directory for this device
    LibraryPathMissing { path: PathBuf },
    /// Vendor/device directory exists but holds no version folders
    EmptyCandidateSet { searched: Vec<PathBuf> },
    /// The disambiguator declined to pick among the candidates
    SelectionDeclined { candidates: usize },
    /// The chosen folder contains no descriptor file
    NoValidDescriptor { folder: PathBuf },
}

impl fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompleteSignature => {
                write!(f, "vendor/device could not be determined from hardware IDs")
            }
            Self::LibraryPathMissing { path } => {
                write!(f, "no matching driver folder found under {}", path.display())
            }
            Self::EmptyCandidateSet { searched } => {
                let searched: Vec<String> =
                    searched.iter().map(|p| p.display().to_string()).collect();
                write!(f, "no driver version folders in {}", searched.join(", "))
            }
            Self::SelectionDeclined { candidates } => {
                write!(f, "no version selected among {} candidates", candidates)
            }
            Self::NoValidDescriptor { folder } => {
                write!(f, "no descriptor file found under {}", folder.display())
            }
        }
    }
}

/// Outcome of one resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Matched(ResolvedPackage),
    NoMatch(NoMatchReason),
}

impl Resolution {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    pub fn package(&self) -> Option<&ResolvedPackage> {
        match self {
            Self::Matched(package) => Some(package),
            Self::NoMatch(_) => None,
        }
    }

    pub fn no_match_reason(&self) -> Option<&NoMatchReason> {
        match self {
            Self::Matched(_) => None,
            Self::NoMatch(reason) => Some(reason),
        }
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Lists the version folders of one library level
type FolderLister = fn(&Path) -> io::Result<Vec<PackageVersionFolder>>;

/// Resolves device signatures against a driver library
#[derive(Debug, Clone)]
pub struct Resolver {
    library: DriverLibrary,
    descriptors: DescriptorPolicy,
    lister: FolderLister,
}

impl Resolver {
    pub fn new(library: DriverLibrary, descriptors: DescriptorPolicy) -> Self {
        Self {
            library,
            descriptors,
            lister: DriverLibrary::version_folders,
        }
    }

    #[cfg(test)]
    fn with_lister(mut self, lister: FolderLister) -> Self {
        self.lister = lister;
        self
    }

    pub fn library(&self) -> &DriverLibrary {
        &self.library
    }

    /// Resolve a signature to exactly one package, or a reason there is none
    pub fn resolve(&self, signature: &DeviceSignature, chooser: &dyn Disambiguator) -> Resolution {
        let resolution = self.resolve_inner(signature, chooser);
        log_resolution(signature, &resolution);
        resolution
    }

    fn resolve_inner(&self, signature: &DeviceSignature, chooser: &dyn Disambiguator) -> Resolution {
        // Step 1: vendor/device directory
        let Some(expected) = self.library.vendor_device_path(signature) else {
            return Resolution::NoMatch(NoMatchReason::IncompleteSignature);
        };
        let Some(vendor_device_dir) = self.library.find_vendor_device_dir(signature) else {
            return Resolution::NoMatch(NoMatchReason::LibraryPathMissing { path: expected });
        };

        let mut searched = Vec::new();

        // Step 2: subsystem scope
        let mut scope = CandidateScope::Subsystem;
        let mut candidates = Vec::new();
        if let Some(subsystem) = signature.subsystem.as_deref() {
            let subsystem_dir = DriverLibrary::subsystem_path(&vendor_device_dir, subsystem);
            if subsystem_dir.is_dir() {
                candidates = self.list_candidates(&subsystem_dir);
                searched.push(subsystem_dir);
            } else {
                debug!(path = ?subsystem_dir, "No subsystem-specific driver folder");
            }
        }

        // Step 3: vendor/device scope when the subsystem scope gave nothing
        if candidates.is_empty() {
            scope = CandidateScope::VendorDevice;
            candidates = self.list_candidates(&vendor_device_dir);
            searched.push(vendor_device_dir);
        }

        // Step 4: selection
        let chosen = match candidates.len() {
            0 => return Resolution::NoMatch(NoMatchReason::EmptyCandidateSet { searched }),
            1 => candidates.swap_remove(0),
            count => match chooser.choose(&candidates) {
                Some(index) if index < count => candidates.swap_remove(index),
                Some(index) => {
                    warn!(index, count, "Disambiguator returned an out-of-range choice");
                    return Resolution::NoMatch(NoMatchReason::SelectionDeclined { candidates: count });
                }
                None => {
                    return Resolution::NoMatch(NoMatchReason::SelectionDeclined { candidates: count })
                }
            },
        };

        // Step 5: descriptor
        match self.descriptors.find_descriptor(&chosen.path) {
            Some(descriptor) => Resolution::Matched(ResolvedPackage {
                folder: chosen,
                descriptor,
                scope,
            }),
            None => Resolution::NoMatch(NoMatchReason::NoValidDescriptor { folder: chosen.path }),
        }
    }

    /// Version folders in `dir`; read errors count as no candidates at this level
    fn list_candidates(&self, dir: &Path) -> Vec<PackageVersionFolder> {
        match (self.lister)(dir) {
            Ok(folders) => folders,
            Err(e) => {
                warn!(path = ?dir, error = %e, "Failed to enumerate driver folders");
                Vec::new()
            }
        }
    }
}

/// Free-function form of [`Resolver::resolve`]
pub fn resolve(
    signature: &DeviceSignature,
    library: &DriverLibrary,
    descriptors: &DescriptorPolicy,
    chooser: &dyn Disambiguator,
) -> Resolution {
    Resolver::new(library.clone(), descriptors.clone()).resolve(signature, chooser)
}


fn log_resolution(signature: &DeviceSignature, resolution: &Resolution) {
    match resolution {
        Resolution::Matched(package) => info!(
            signature = %signature,
            folder = ?package.folder.path,
            descriptor = ?package.descriptor,
            scope = ?package.scope,
            "Matched driver folder"
        ),
        Resolution::NoMatch(reason @ NoMatchReason::IncompleteSignature) => {
            warn!(signature = %signature, "No driver match: {}", reason)
        }
        Resolution::NoMatch(reason @ NoMatchReason::LibraryPathMissing { .. }) => {
            info!(signature = %signature, "No driver match: {}", reason)
        }
        Resolution::NoMatch(reason @ NoMatchReason::EmptyCandidateSet { .. }) => {
            warn!(signature = %signature, "Empty candidate set: {}", reason)
        }
        Resolution::NoMatch(reason @ NoMatchReason::SelectionDeclined { .. }) => {
            info!(signature = %signature, "Driver selection declined: {}", reason)
        }
        Resolution::NoMatch(reason @ NoMatchReason::NoValidDescriptor { .. }) => {
            warn!(signature = %signature, "Malformed driver package: {}", reason)
        }
    }
}
