//! Unified error handling for drvkit
//!
//! This crate provides a single error type used across all drvkit components.
//! It uses thiserror for ergonomic error definitions with proper Display and Error trait impls.
//!
//! Matching and resolution never produce these errors: they return structured
//! "no result" values instead. Errors here are for the surrounding run
//! (configuration, inventory, installation, export, host commands).

use std::io;
use std::path::PathBuf;

/// Result type alias using DriverKitError
pub type Result<T> = std::result::Result<T, DriverKitError>;

/// Unified error type for all drvkit operations
#[derive(thiserror::Error, Debug)]
pub enum DriverKitError {
    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: io::Error,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    // ============================================================================
    // Run Phase Errors
    // ============================================================================
    #[error("Failed to gather system inventory: {0}")]
    Inventory(String),

    #[error("Driver installation from {descriptor} failed (exit code {code:?})")]
    Installation {
        descriptor: PathBuf,
        code: Option<i32>,
    },

    #[error("Driver export of {package} to {destination} failed: {reason}")]
    Export {
        package: String,
        destination: PathBuf,
        reason: String,
    },

    // ============================================================================
    // Host Command Errors
    // ============================================================================
    #[error("Failed to launch {program}: {source}")]
    CommandSpawn {
        program: String,
        source: io::Error,
    },

    #[error("{program} exited with code {code:?}: {stderr}")]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Generic(String),
}

impl DriverKitError {
    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an inventory error from a string
    pub fn inventory(msg: impl Into<String>) -> Self {
        Self::Inventory(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error terminates a run.
    ///
    /// Only inventory and installation failures end a run; everything else is
    /// reported and the run moves on to its next independent phase.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Inventory(_) | Self::Installation { .. })
    }
}

// Allow converting from String to DriverKitError
impl From<String> for DriverKitError {
    fn from(s: String) -> Self {
        Self::Generic(s)
    }
}

// Allow converting from &str to DriverKitError
impl From<&str> for DriverKitError {
    fn from(s: &str) -> Self {
        Self::Generic(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(DriverKitError::inventory("no output").is_fatal());
        assert!(DriverKitError::Installation {
            descriptor: PathBuf::from("iigd_dch.inf"),
            code: Some(1),
        }
        .is_fatal());
        assert!(!DriverKitError::config("bad").is_fatal());
        assert!(!DriverKitError::Export {
            package: "oem12.inf".to_string(),
            destination: PathBuf::from("/tmp/out"),
            reason: "denied".to_string(),
        }
        .is_fatal());
    }

    #[test]
    fn test_display_messages() {
        let err = DriverKitError::invalid_config("descriptor_extension", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for descriptor_extension: must not be empty"
        );

        let err: DriverKitError = "plain message".into();
        assert_eq!(err.to_string(), "plain message");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: DriverKitError = parse.unwrap_err().into();
        assert!(matches!(err, DriverKitError::JsonParse(_)));
    }
}
