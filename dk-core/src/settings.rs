//! Toolkit Settings
//!
//! Persistent settings stored as JSON in `<toolkit root>/drvkit.json`.
//! The toolkit normally runs from removable media, so the root defaults to
//! the directory holding the executable rather than a per-user config dir.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{descriptor, env, paths};
use crate::descriptor::DescriptorPolicy;
use crate::error::{DriverKitError, Result};
use crate::library::DriverLibrary;
use crate::resolver::Resolver;

/// All toolkit settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolkitSettings {
    /// Toolkit root; relative paths below resolve against it
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Driver library directory
    #[serde(default = "default_library_dir")]
    pub library_dir: PathBuf,

    /// Directory receiving one log file per run
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Descriptor file extension, without the dot
    #[serde(default = "default_descriptor_extension")]
    pub descriptor_extension: String,

    /// Descriptor name prefixes preferred over other descriptors
    #[serde(default = "default_preferred_prefixes")]
    pub preferred_prefixes: Vec<String>,

    /// Ask the operator when several versions match
    #[serde(default = "default_true")]
    pub interactive: bool,

    /// Export the installed package into the library after a run
    #[serde(default = "default_true")]
    pub export_after_run: bool,
}

fn default_library_dir() -> PathBuf {
    PathBuf::from(paths::DRIVER_LIBRARY)
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(paths::LOG_DIR)
}

fn default_descriptor_extension() -> String {
    descriptor::EXTENSION.to_string()
}

fn default_preferred_prefixes() -> Vec<String> {
    descriptor::PREFERRED_PREFIXES
        .iter()
        .map(|p| p.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

impl Default for ToolkitSettings {
    fn default() -> Self {
        Self {
            root: None,
            library_dir: default_library_dir(),
            log_dir: default_log_dir(),
            descriptor_extension: default_descriptor_extension(),
            preferred_prefixes: default_preferred_prefixes(),
            interactive: true,
            export_after_run: true,
        }
    }
}

impl ToolkitSettings {
    /// Effective toolkit root
    pub fn root_dir(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(paths::default_root)
    }

    /// Effective driver library path
    pub fn library_path(&self) -> PathBuf {
        self.resolve_path(&self.library_dir)
    }

    /// Effective log directory
    pub fn log_path(&self) -> PathBuf {
        self.resolve_path(&self.log_dir)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_dir().join(path)
        }
    }

    /// Descriptor recognition built from these settings
    pub fn descriptor_policy(&self) -> DescriptorPolicy {
        DescriptorPolicy::with_prefixes(&self.descriptor_extension, &self.preferred_prefixes)
    }

    /// Resolver over the configured library
    pub fn resolver(&self) -> Resolver {
        Resolver::new(DriverLibrary::new(self.library_path()), self.descriptor_policy())
    }

    /// Apply `DRVKIT_ROOT` / `DRVKIT_LIBRARY` overrides
    pub fn apply_env_overrides(&mut self) {
        if let Some(root) = std::env::var_os(env::ROOT).filter(|v| !v.is_empty()) {
            debug!(root = ?root, "Toolkit root overridden from environment");
            self.root = Some(PathBuf::from(root));
        }
        if let Some(library) = std::env::var_os(env::LIBRARY).filter(|v| !v.is_empty()) {
            debug!(library = ?library, "Driver library overridden from environment");
            self.library_dir = PathBuf::from(library);
        }
    }

    /// Reject settings resolution cannot work with
    pub fn validate(&self) -> Result<()> {
        let extension = self.descriptor_extension.trim_start_matches('.');
        if extension.is_empty() {
            return Err(DriverKitError::invalid_config(
                "descriptor_extension",
                "must not be empty",
            ));
        }
        if !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DriverKitError::invalid_config(
                "descriptor_extension",
                format!("'{}' must be alphanumeric", self.descriptor_extension),
            ));
        }

        for prefix in &self.preferred_prefixes {
            if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(DriverKitError::invalid_config(
                    "preferred_prefixes",
                    format!("'{}' is not a valid descriptor name prefix", prefix),
                ));
            }
        }

        if self.library_dir.as_os_str().is_empty() {
            return Err(DriverKitError::invalid_config("library_dir", "must not be empty"));
        }

        Ok(())
    }
}

/// Settings file location for a toolkit root
pub fn get_settings_path(root: &Path) -> PathBuf {
    root.join(paths::SETTINGS_FILE)
}

/// Load settings from `path`, or from the default root when `None`
///
/// A missing file yields defaults. Environment overrides are applied and the
/// result is validated.
pub fn load_settings(path: Option<&Path>) -> Result<ToolkitSettings> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => get_settings_path(&paths::default_root()),
    };

    let mut settings = if path.exists() {
        let content = fs::read_to_string(&path).map_err(|source| DriverKitError::FileRead {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| {
            DriverKitError::config(format!("Failed to parse {}: {}", path.display(), e))
        })?
    } else {
        debug!(path = ?path, "No settings file found, using defaults");
        ToolkitSettings::default()
    };

    // A settings file sitting in the toolkit root anchors relative paths there
    if settings.root.is_none() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            settings.root = Some(parent.to_path_buf());
        }
    }

    settings.apply_env_overrides();
    settings.validate()?;
    Ok(settings)
}

/// Write settings as pretty JSON
pub fn save_settings(settings: &ToolkitSettings, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}
