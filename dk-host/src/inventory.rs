//! System inventory through CIM/PnP queries

use dk_core::{InventorySource, SystemInventory};
use dk_error::DriverKitError;
use tracing::debug;

use crate::command::{CommandRunner, SystemRunner};
use crate::powershell::run_ps;

/// Emits one compressed JSON object in the shape [`SystemInventory`] reads
pub const INVENTORY_SCRIPT: &str = r#"
$cs  = Get-CimInstance -ClassName Win32_ComputerSystem
$bios= Get-CimInstance -ClassName Win32_BIOS
$prod= Get-CimInstance -ClassName Win32_ComputerSystemProduct
$gpu = Get-CimInstance -ClassName Win32_VideoController | Select-Object -First 1 Name, DriverVersion, DriverDate
$disp= Get-PnpDevice -Class Display | Where-Object {$_.Status -eq 'OK'} | Select-Object -First 1
$hw  = Get-PnpDeviceProperty -InstanceId $disp.InstanceId -KeyName 'DEVPKEY_Device_HardwareIds'
$ids = @($hw.Data)
$signed = Get-CimInstance -ClassName Win32_PnPSignedDriver | Where-Object {$_.DeviceClass -eq 'DISPLAY'} | Select-Object -First 1 InfName, DriverVersion

[PSCustomObject]@{
  Manufacturer  = $cs.Manufacturer
  Model         = $cs.Model
  Product       = $prod.Name
  BIOSVersion   = $bios.SMBIOSBIOSVersion
  Serial        = $bios.SerialNumber
  GPUName       = $gpu.Name
  GPUDriver     = $gpu.DriverVersion
  GPUDriverDate = $gpu.DriverDate
  HardwareIds   = $ids
  CurrentInf    = $signed.InfName
  CurrentDrvVer = $signed.DriverVersion
} | ConvertTo-Json -Compress
"#;

/// Inventory collected by PowerShell
#[derive(Debug, Clone, Default)]
pub struct PowerShellInventory<R = SystemRunner> {
    runner: R,
}

impl PowerShellInventory<SystemRunner> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: CommandRunner> PowerShellInventory<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> InventorySource for PowerShellInventory<R> {
    fn collect(&self) -> dk_core::Result<SystemInventory> {
        let output = run_ps(&self.runner, INVENTORY_SCRIPT)
            .map_err(|e| DriverKitError::inventory(e.to_string()))?;
        debug!(bytes = output.len(), "Inventory query finished");
        SystemInventory::from_json(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandOutput, MockCommandRunner};

    fn runner_printing(stdout: &'static str) -> MockCommandRunner {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(1).returning(move |_, _| {
            Ok(CommandOutput {
                code: Some(0),
                stdout: stdout.to_string(),
                stderr: String::new(),
            })
        });
        runner
    }

    #[test]
    fn test_collect_parses_output() {
        let inventory = PowerShellInventory::with_runner(runner_printing(
            r#"{"GPUName":"Intel(R) UHD Graphics","HardwareIds":["PCI\\VEN_8086&DEV_8A56&SUBSYS_86AB103C&REV_0C"],"CurrentInf":"oem7.inf"}"#,
        ));

        let record = inventory.collect().unwrap();
        assert_eq!(record.gpu_name.as_deref(), Some("Intel(R) UHD Graphics"));
        assert_eq!(record.signature().to_string(), "VEN=8086 DEV=8A56 SUBSYS=86AB103C");
    }

    #[test]
    fn test_empty_output_fails() {
        let inventory = PowerShellInventory::with_runner(runner_printing(""));
        let err = inventory.collect().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_failed_query_is_inventory_error() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(1).returning(|_, _| {
            Ok(CommandOutput {
                code: Some(1),
                stdout: String::new(),
                stderr: "Get-CimInstance : Access denied".to_string(),
            })
        });

        let err = PowerShellInventory::with_runner(runner).collect().unwrap_err();
        assert!(matches!(err, DriverKitError::Inventory(ref msg) if msg.contains("Access denied")));
    }
}
