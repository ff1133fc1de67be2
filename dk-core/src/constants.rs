//! Constants and configuration defaults for drvkit
//!
//! Centralizes paths, hardware-identifier token names, library layout names
//! and policy values. Add new magic values here first.

/// Toolkit paths, relative to the toolkit root unless noted
pub mod paths {
    /// Driver library location under the toolkit root
    pub const DRIVER_LIBRARY: &str = "Drivers/Intel";

    /// Per-run log directory under the toolkit root
    pub const LOG_DIR: &str = "Logs";

    /// Settings file name, looked up in the toolkit root
    pub const SETTINGS_FILE: &str = "drvkit.json";

    /// Log file name prefix; a `%Y%m%d-%H%M%S` timestamp and `.txt` follow
    pub const LOG_FILE_PREFIX: &str = "log-";

    /// Resolve the default toolkit root: the directory holding the executable
    pub fn default_root() -> std::path::PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| std::path::PathBuf::from("."))
    }
}

/// Environment variable overrides
pub mod env {
    /// Overrides the toolkit root directory
    pub const ROOT: &str = "DRVKIT_ROOT";

    /// Overrides the driver library directory (absolute, or relative to the root)
    pub const LIBRARY: &str = "DRVKIT_LIBRARY";
}

/// Hardware identifier token layout (`PCI\VEN_8086&DEV_8A56&SUBSYS_86AB103C&REV_0C`)
pub mod hwid {
    pub const VENDOR_TOKEN: &str = "VEN_";
    pub const DEVICE_TOKEN: &str = "DEV_";
    pub const SUBSYSTEM_TOKEN: &str = "SUBSYS_";

    /// Hex digits in a vendor code
    pub const VENDOR_DIGITS: usize = 4;
    /// Hex digits in a device code
    pub const DEVICE_DIGITS: usize = 4;
    /// Hex digits in a subsystem code
    pub const SUBSYSTEM_DIGITS: usize = 8;
}

/// Driver library directory naming
pub mod library {
    /// Prefix of subsystem-scoped directories (`SUBSYS_86AB103C`)
    pub const SUBSYSTEM_DIR_PREFIX: &str = "SUBSYS_";

    /// Alternate prefix accepted on vendor/device directories (`VEN_8086_8A56`)
    pub const VENDOR_DIR_ALIAS_PREFIX: &str = "VEN_";

    /// Suffix appended to the driver version for exported package folders
    pub const EXPORT_SUFFIX: &str = "-exported";

    /// Driver version used for export folders when none is reported
    pub const UNKNOWN_VERSION: &str = "unknown";
}

/// Package descriptor defaults
pub mod descriptor {
    /// Descriptor (information file) extension, without the dot
    pub const EXTENSION: &str = "inf";

    /// Display driver descriptor name prefixes preferred over other descriptors
    pub const PREFERRED_PREFIXES: &[&str] = &["iigd", "igd"];
}

/// Automatic driver update policy values
pub mod policy {
    pub const WINDOWS_UPDATE_KEY: &str = r"HKLM:\SOFTWARE\Policies\Microsoft\Windows\WindowsUpdate";
    pub const EXCLUDE_DRIVERS_VALUE: &str = "ExcludeWUDriversInQualityUpdate";

    pub const DRIVER_SEARCHING_KEY: &str =
        r"HKLM:\SOFTWARE\Microsoft\Windows\CurrentVersion\DriverSearching";
    pub const SEARCH_ORDER_VALUE: &str = "SearchOrderConfig";

    /// Service name/display-name pattern of the vendor update assistant
    pub const UPDATE_ASSISTANT_PATTERN: &str = "*Intel*Driver*Support*Assistant*";
}

/// Process exit codes for terminal run outcomes
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const INVENTORY_FAILED: i32 = 1;
    pub const CONFIG_FAILED: i32 = 2;
    pub const INSTALLATION_FAILED: i32 = 3;
}
