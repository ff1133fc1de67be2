//! Package descriptor lookup
//!
//! A package version folder holds one primary descriptor (an `.inf`
//! information file) somewhere below it. Vendor display packages often ship
//! auxiliary descriptors too, so names matching the display-driver naming
//! convention are preferred over any other descriptor.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use walkdir::WalkDir;

use crate::constants::descriptor as defaults;

/// Predicate deciding whether a descriptor file name is the preferred kind
pub type PreferredNamePredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// How descriptor files are recognized and ranked
#[derive(Clone)]
pub struct DescriptorPolicy {
    extension: String,
    preferred: PreferredNamePredicate,
}

impl DescriptorPolicy {
    /// Descriptors with `extension`, preferring names starting with any of `prefixes`
    ///
    /// Both comparisons are case-insensitive.
    pub fn with_prefixes<S: AsRef<str>>(extension: &str, prefixes: &[S]) -> Self {
        let prefixes: Vec<String> = prefixes
            .iter()
            .map(|p| p.as_ref().to_ascii_lowercase())
            .collect();

        Self {
            extension: normalize_extension(extension),
            preferred: Arc::new(move |name: &str| {
                let name = name.to_ascii_lowercase();
                prefixes.iter().any(|p| name.starts_with(p.as_str()))
            }),
        }
    }

    /// Descriptors with `extension`, ranked by a caller-supplied predicate
    pub fn with_predicate<F>(extension: &str, preferred: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            extension: normalize_extension(extension),
            preferred: Arc::new(preferred),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// File has the descriptor extension
    pub fn is_descriptor(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension))
    }

    /// Descriptor file name follows the preferred naming convention
    pub fn is_preferred(&self, file_name: &str) -> bool {
        (self.preferred)(file_name)
    }

    /// Find the descriptor to install from `folder`
    ///
    /// Walks the folder depth-first in file-name order. The first preferred
    /// descriptor wins; otherwise the first descriptor of any name. `None`
    /// means the folder is not a usable package.
    pub fn find_descriptor(&self, folder: &Path) -> Option<PathBuf> {
        let mut fallback: Option<PathBuf> = None;

        for entry in WalkDir::new(folder).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(folder = ?folder, error = %e, "Skipping unreadable entry during descriptor search");
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.is_descriptor(entry.path()) {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if self.is_preferred(&name) {
                return Some(entry.into_path());
            }
            if fallback.is_none() {
                fallback = Some(entry.into_path());
            }
        }

        fallback
    }
}

impl Default for DescriptorPolicy {
    fn default() -> Self {
        Self::with_prefixes(defaults::EXTENSION, defaults::PREFERRED_PREFIXES)
    }
}

impl fmt::Debug for DescriptorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorPolicy")
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}
