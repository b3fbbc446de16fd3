//! 扫描命令

use crate::console;
use crate::console::RoleArg;
use antenna_sdk::{Device, DeviceDescriptor, DeviceRegistry, DeviceRole, RangeConfig};
use anyhow::Result;
use clap::Args;
use serde::Serialize;

/// 扫描命令参数
#[derive(Args, Debug)]
pub struct ScanCommand {
    /// 只扫描某个角色（默认全部）
    #[arg(short, long)]
    pub role: Option<RoleArg>,

    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ScanReport {
    role: DeviceRole,
    devices: Vec<DeviceDescriptor>,
}

impl ScanCommand {
    pub fn execute(&self, config: &RangeConfig) -> Result<()> {
        let registry = DeviceRegistry::with_simulators(config.simulator_profile());
        let roles = match self.role {
            Some(role) => vec![DeviceRole::from(role)],
            None => DeviceRole::ALL.to_vec(),
        };

        let mut reports = Vec::with_capacity(roles.len());
        for role in roles {
            let handle = console::create_device(&registry, role)?;
            reports.push(ScanReport {
                role,
                devices: handle.scan(),
            });
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&reports)?);
            return Ok(());
        }

        for report in &reports {
            println!("{} ({} found)", report.role, report.devices.len());
            for device in &report.devices {
                let marker = if device.available { "" } else { " [unavailable]" };
                println!("  - {}{}", device, marker);
            }
        }
        Ok(())
    }
}
