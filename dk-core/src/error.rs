//! Error types shared with the rest of the workspace

pub use dk_error::{DriverKitError, Result};
