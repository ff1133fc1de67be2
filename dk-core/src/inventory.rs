//! System inventory record
//!
//! The inventory collaborator reports the machine and display adapter as one
//! flat JSON object with PascalCase keys. Every field is optional; a missing
//! or empty `HardwareIds` simply yields an empty signature later on.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DriverKitError, Result};
use crate::identifier::{self, DeviceSignature};

/// Machine and display adapter facts gathered before resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemInventory {
    #[serde(rename = "Manufacturer", default)]
    pub manufacturer: Option<String>,
    #[serde(rename = "Model", default)]
    pub model: Option<String>,
    #[serde(rename = "Product", default)]
    pub product: Option<String>,
    #[serde(rename = "BIOSVersion", default)]
    pub bios_version: Option<String>,
    #[serde(rename = "Serial", default)]
    pub serial: Option<String>,
    #[serde(rename = "GPUName", default)]
    pub gpu_name: Option<String>,
    #[serde(rename = "GPUDriver", default)]
    pub gpu_driver_version: Option<String>,
    /// Reported as whatever the host serializer emits for dates
    #[serde(rename = "GPUDriverDate", default)]
    pub gpu_driver_date: Option<serde_json::Value>,
    /// Most specific first
    #[serde(rename = "HardwareIds", default, deserialize_with = "one_or_many")]
    pub hardware_ids: Vec<String>,
    /// Descriptor name of the installed display package (e.g. `oem42.inf`)
    #[serde(rename = "CurrentInf", default)]
    pub current_descriptor: Option<String>,
    #[serde(rename = "CurrentDrvVer", default)]
    pub current_driver_version: Option<String>,
}

impl SystemInventory {
    /// Parse the collaborator's JSON output
    ///
    /// Empty output, or a record with every field absent, means no record
    /// was obtained at all.
    pub fn from_json(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DriverKitError::inventory("inventory query returned no output"));
        }
        let record: Self = serde_json::from_str(text)
            .map_err(|e| DriverKitError::inventory(format!("unparsable inventory record: {}", e)))?;
        if record == Self::default() {
            return Err(DriverKitError::inventory("inventory record is empty"));
        }
        Ok(record)
    }

    /// Device signature from the reported hardware IDs
    pub fn signature(&self) -> DeviceSignature {
        identifier::extract(&self.hardware_ids)
    }

    /// Installed driver version, preferring the signed-driver record
    pub fn driver_version(&self) -> Option<&str> {
        fn reported(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|v| !v.trim().is_empty())
        }
        reported(&self.current_driver_version).or_else(|| reported(&self.gpu_driver_version))
    }
}

/// Source of the inventory record
#[cfg_attr(test, mockall::automock)]
pub trait InventorySource {
    fn collect(&self) -> Result<SystemInventory>;
}

/// Hardware IDs arrive as an array, a lone string, or null
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<Option<String>>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(id)) => vec![id],
        Some(OneOrMany::Many(ids)) => ids.into_iter().flatten().collect(),
    })
}
