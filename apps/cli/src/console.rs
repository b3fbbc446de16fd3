//! 控制台输出与参数类型

use antenna_sdk::driver::EventSink;
use antenna_sdk::types::{DeviceDescriptor, DeviceError, MotionMode, MotionSummary, PositionState, SpectralPeak};
use antenna_sdk::{Axis, DeviceHandle, DeviceRegistry, DeviceRole};
use anyhow::{Context, Result};
use clap::ValueEnum;

/// 设备角色参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    /// 频谱分析仪
    Analyzer,
    /// 信号源
    Generator,
    /// 定位器
    Positioner,
}

impl From<RoleArg> for DeviceRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Analyzer => DeviceRole::SignalAnalyzer,
            RoleArg::Generator => DeviceRole::SignalGenerator,
            RoleArg::Positioner => DeviceRole::Positioner,
        }
    }
}

/// 轴参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AxisArg {
    Az,
    El,
    Pol,
    X,
    Y,
    V,
}

impl From<AxisArg> for Axis {
    fn from(axis: AxisArg) -> Self {
        match axis {
            AxisArg::Az => Axis::Az,
            AxisArg::El => Axis::El,
            AxisArg::Pol => Axis::Pol,
            AxisArg::X => Axis::X,
            AxisArg::Y => Axis::Y,
            AxisArg::V => Axis::V,
        }
    }
}

/// 创建某个角色的设备（取注册表中该角色的第一个插件）
pub fn create_device(registry: &DeviceRegistry, role: DeviceRole) -> Result<DeviceHandle> {
    let plugin = registry
        .first_for(role)
        .with_context(|| format!("No plugin registered for {}", role))?;
    registry.create(plugin).with_context(|| format!("Failed to create {}", plugin))
}

/// 把所有事件打印到控制台
pub fn attach_printer(events: &EventSink) {
    events.devices_found.set(|devices: &[DeviceDescriptor]| {
        println!("[Callback] Devices scanned: {} device(s) found", devices.len());
        for device in devices {
            println!("  - {}", device);
        }
    });
    events.connected.set(|address: &str| println!("[Callback] Connected! ({})", address));
    events.disconnected.set(|_| println!("[Callback] Disconnected!"));
    events.error.set(|err: &DeviceError| println!("[Callback] Error: {}", err));
    events.peak_found.set(|peak: &SpectralPeak| {
        println!(
            "[Callback] Peak found! Freq: {:.3} MHz, Power: {:.2} dBm",
            peak.frequency_hz / 1e6,
            peak.level_dbm
        )
    });
    events.output_enabled.set(|_| println!("[Callback] RF Enabled!"));
    events.output_disabled.set(|_| println!("[Callback] RF Disabled!"));
    events
        .motion_started
        .set(|mode: &MotionMode| println!("[Callback] Movement started! ({})", mode));
    events.motion_stopped.set(|summary: &MotionSummary| {
        println!(
            "[Callback] Movement stopped! {} after {} step(s), at {}",
            summary.reason, summary.steps_taken, summary.final_position
        )
    });
    events
        .position_changed
        .set(|pos: &PositionState| println!("[Callback] Position: {}", pos));
}

/// 步骤标题
pub fn step(index: usize, title: &str) {
    println!("\n[Step {}] {}", index, title);
}

/// 分隔横幅
pub fn banner(title: &str) {
    println!("\n========================================");
    println!("{}", title);
    println!("========================================\n");
}
