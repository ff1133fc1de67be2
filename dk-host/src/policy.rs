//! Automatic driver update suppression
//!
//! Three independent steps, each tolerated on failure:
//! - exclude drivers from quality updates (policy key)
//! - stop the OS searching for drivers on device arrival
//! - stop and disable the vendor driver update assistant, if installed

use dk_core::constants::policy;
use dk_core::UpdateSuppressor;
use tracing::{info, warn};

use crate::command::{CommandRunner, SystemRunner};
use crate::powershell::run_ps_step;

/// One suppression step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyStep {
    pub name: &'static str,
    pub script: String,
}

/// The steps, in the order they run
pub fn suppression_steps() -> Vec<PolicyStep> {
    vec![
        PolicyStep {
            name: "exclude-update-drivers",
            script: format!(
                "New-Item -Path \"{key}\" -Force | Out-Null\n\
                 New-ItemProperty -Path \"{key}\" -Name \"{value}\" -PropertyType DWord -Value 1 -Force | Out-Null",
                key = policy::WINDOWS_UPDATE_KEY,
                value = policy::EXCLUDE_DRIVERS_VALUE,
            ),
        },
        PolicyStep {
            name: "driver-search-order",
            script: format!(
                "New-ItemProperty -Path \"{key}\" -Name \"{value}\" -PropertyType DWord -Value 0 -Force | Out-Null",
                key = policy::DRIVER_SEARCHING_KEY,
                value = policy::SEARCH_ORDER_VALUE,
            ),
        },
        PolicyStep {
            name: "disable-update-assistant",
            script: format!(
                "$svc = Get-Service | Where-Object {{$_.Name -like '{pattern}' -or $_.DisplayName -like '{pattern}'}}\n\
                 if ($svc) {{ Stop-Service $svc -Force -ErrorAction SilentlyContinue; Set-Service $svc -StartupType Disabled }}",
                pattern = policy::UPDATE_ASSISTANT_PATTERN,
            ),
        },
    ]
}

/// Registry and service based update suppression
#[derive(Debug, Clone, Default)]
pub struct RegistryPolicy<R = SystemRunner> {
    runner: R,
}

impl RegistryPolicy<SystemRunner> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: CommandRunner> RegistryPolicy<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> UpdateSuppressor for RegistryPolicy<R> {
    fn suppress_automatic_updates(&self) -> bool {
        info!("Blocking automatic driver delivery (policy and device settings)");

        let mut all_applied = true;
        for step in suppression_steps() {
            if run_ps_step(&self.runner, &step.script) {
                info!(step = step.name, "Applied");
            } else {
                warn!(step = step.name, "Step failed; continuing");
                all_applied = false;
            }
        }
        all_applied
    }
}
