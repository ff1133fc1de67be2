//! Operating system adapters for drvkit
//!
//! Implements the core's collaborator traits with the platform's own tools:
//! - inventory via PowerShell CIM/PnP queries
//! - install and export via `pnputil`
//! - update suppression via policy registry values and service control
//!
//! All calls are synchronous and go through a [`CommandRunner`].

pub mod command;
pub mod inventory;
pub mod pnputil;
pub mod policy;
pub mod powershell;

pub use command::{run_logged, CommandOutput, CommandRunner, SystemRunner};
pub use inventory::PowerShellInventory;
pub use pnputil::PnpUtil;
pub use policy::{suppression_steps, PolicyStep, RegistryPolicy};

pub type Result<T> = std::result::Result<T, dk_error::DriverKitError>;
