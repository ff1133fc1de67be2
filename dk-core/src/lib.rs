//! drvkit Core Library
//!
//! Matches a display adapter to a known-good driver package in a local
//! library and drives one install run.
//!
//! # Module Structure
//!
//! - `identifier` - hardware ID parsing into a [`DeviceSignature`]
//! - `library` / `descriptor` - reading the driver library tree
//! - `selection` / `resolver` - choosing exactly one package, or saying why not
//! - `inventory` / `host` - collaborator interfaces to the operating system
//! - `export` / `pipeline` - the run sequence around resolution
//! - `settings` / `constants` - configuration
//!
//! # Example
//!
//! ```no_run
//! use dk_core::{extract, DescriptorPolicy, DriverLibrary, NewestFirst, Resolver};
//!
//! let signature = extract(["PCI\\VEN_8086&DEV_8A56&SUBSYS_86AB103C&REV_0C"]);
//! let resolver = Resolver::new(DriverLibrary::new("Drivers/Intel"), DescriptorPolicy::default());
//! let resolution = resolver.resolve(&signature, &NewestFirst);
//! ```

pub mod constants;
pub mod descriptor;
pub mod error;
pub mod export;
pub mod host;
pub mod identifier;
pub mod inventory;
pub mod library;
pub mod pipeline;
pub mod resolver;
pub mod selection;
pub mod settings;

// Re-export error types
pub use error::{DriverKitError, Result};

pub use identifier::{extract, DeviceSignature, SignatureField, TokenRule, SIGNATURE_RULES};

pub use library::{is_subsystem_dir_name, DriverLibrary, PackageVersionFolder};

pub use descriptor::{DescriptorPolicy, PreferredNamePredicate};

pub use selection::{newest_first_order, Disambiguator, NewestFirst};

pub use resolver::{resolve, CandidateScope, NoMatchReason, Resolution, ResolvedPackage, Resolver};

pub use inventory::{InventorySource, SystemInventory};

pub use host::{PackageExporter, PackageInstaller, UpdateSuppressor};

pub use export::{export_current_package, export_destination, export_folder_name};

pub use pipeline::{run, Collaborators, RunOptions, RunOutcome, RunReport};

pub use settings::{get_settings_path, load_settings, save_settings, ToolkitSettings};
