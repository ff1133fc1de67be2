//! Hardware identifier extraction
//!
//! Turns the loosely structured hardware ID strings a device reports
//! (`PCI\VEN_8086&DEV_8A56&SUBSYS_86AB103C&REV_0C`, most specific first) into a
//! normalized [`DeviceSignature`].
//!
//! Extraction is an ordered list of per-field token rules applied to every
//! identifier string. The first value found for a field wins; later strings
//! only fill fields that are still empty.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

use crate::constants::hwid;

// ============================================================================
// Device Signature
// ============================================================================

/// Normalized (vendor, device, subsystem) triple
///
/// Each field holds uppercase hex digits when present. Absent fields mean
/// "unknown" and degrade matching; they are never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceSignature {
    /// 4 hex digits
    pub vendor: Option<String>,
    /// 4 hex digits
    pub device: Option<String>,
    /// 8 hex digits
    pub subsystem: Option<String>,
}

impl DeviceSignature {
    /// Build a signature from already-known codes, normalizing case
    pub fn new(vendor: Option<&str>, device: Option<&str>, subsystem: Option<&str>) -> Self {
        Self {
            vendor: vendor.map(str::to_ascii_uppercase),
            device: device.map(str::to_ascii_uppercase),
            subsystem: subsystem.map(str::to_ascii_uppercase),
        }
    }

    /// All three fields are known
    pub fn is_complete(&self) -> bool {
        self.vendor.is_some() && self.device.is_some() && self.subsystem.is_some()
    }

    /// No field is known
    pub fn is_empty(&self) -> bool {
        self.vendor.is_none() && self.device.is_none() && self.subsystem.is_none()
    }

    /// Library directory key `VENDOR_DEVICE`, if both halves are known
    pub fn vendor_device_key(&self) -> Option<String> {
        match (&self.vendor, &self.device) {
            (Some(vendor), Some(device)) => Some(format!("{}_{}", vendor, device)),
            _ => None,
        }
    }

    fn slot(&mut self, field: SignatureField) -> &mut Option<String> {
        match field {
            SignatureField::Vendor => &mut self.vendor,
            SignatureField::Device => &mut self.device,
            SignatureField::Subsystem => &mut self.subsystem,
        }
    }
}

impl fmt::Display for DeviceSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VEN={} DEV={} SUBSYS={}",
            self.vendor.as_deref().unwrap_or("N/A"),
            self.device.as_deref().unwrap_or("N/A"),
            self.subsystem.as_deref().unwrap_or("N/A"),
        )
    }
}

// ============================================================================
// Token Rules
// ============================================================================

/// Signature field a token rule fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureField {
    Vendor,
    Device,
    Subsystem,
}

/// One field extractor: a token prefix followed by a fixed number of hex digits
#[derive(Debug, Clone, Copy)]
pub struct TokenRule {
    pub field: SignatureField,
    pub token: &'static str,
    pub digits: usize,
}

impl TokenRule {
    /// Find the first `TOKEN` + hex-run in `id`, case-insensitively
    ///
    /// Digits beyond the rule's width are ignored, so `VEN_80861` yields `8086`.
    pub fn scan(&self, id: &str) -> Option<String> {
        let upper = id.to_ascii_uppercase();
        let bytes = upper.as_bytes();

        let mut from = 0;
        while let Some(offset) = upper[from..].find(self.token) {
            let start = from + offset + self.token.len();
            let end = start + self.digits;
            if end <= bytes.len() && bytes[start..end].iter().all(u8::is_ascii_hexdigit) {
                return Some(upper[start..end].to_string());
            }
            from = from + offset + 1;
        }
        None
    }
}

/// Rules applied to each identifier string, in order
pub const SIGNATURE_RULES: [TokenRule; 3] = [
    TokenRule {
        field: SignatureField::Vendor,
        token: hwid::VENDOR_TOKEN,
        digits: hwid::VENDOR_DIGITS,
    },
    TokenRule {
        field: SignatureField::Device,
        token: hwid::DEVICE_TOKEN,
        digits: hwid::DEVICE_DIGITS,
    },
    TokenRule {
        field: SignatureField::Subsystem,
        token: hwid::SUBSYSTEM_TOKEN,
        digits: hwid::SUBSYSTEM_DIGITS,
    },
];

// ============================================================================
// Extraction
// ============================================================================

/// Extract a device signature from an ordered sequence of hardware IDs
///
/// Scanning stops as soon as all three fields are filled. An identifier that
/// yields no usable token is skipped.
pub fn extract<I, S>(ids: I) -> DeviceSignature
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut signature = DeviceSignature::default();

    for id in ids {
        let id = id.as_ref();
        let mut matched_any = false;

        for rule in &SIGNATURE_RULES {
            let slot = signature.slot(rule.field);
            if slot.is_some() {
                continue;
            }
            if let Some(value) = rule.scan(id) {
                *slot = Some(value);
                matched_any = true;
            }
        }

        if !matched_any {
            trace!(identifier = %id, "Hardware identifier contributed no tokens");
        }

        if signature.is_complete() {
            break;
        }
    }

    signature
}
