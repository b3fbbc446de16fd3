//! 脚本化设备演练
//!
//! 按固定步骤走完一个设备的完整生命周期：扫描、连接（有设备时连接第一个，
//! 否则隐式连接）、配置、操作、断开。每个事件回调都会打印到控制台。

use super::{WaitOutcome, wait_for_motion};
use crate::console::{self, RoleArg};
use antenna_sdk::{
    Axis, AxisMap, Device, DeviceHandle, DeviceRegistry, DeviceRole, Direction, MotionConfig, RangeConfig,
};
use anyhow::{Context, Result};
use clap::Args;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::Duration;

/// 演练命令参数
#[derive(Args, Debug)]
pub struct ExerciseCommand {
    /// 设备角色
    #[arg(value_enum)]
    pub role: RoleArg,

    /// 连接指定地址或序列号（默认连接扫描到的第一个设备）
    #[arg(short, long)]
    pub address: Option<String>,
}

impl ExerciseCommand {
    pub fn execute(&self, config: &RangeConfig) -> Result<()> {
        let registry = DeviceRegistry::with_simulators(config.simulator_profile());
        let role = DeviceRole::from(self.role);
        let handle = console::create_device(&registry, role)?;
        console::attach_printer(handle.events());

        console::banner(&format!("Testing {}", role));

        console::step(1, "Scanning for devices...");
        let devices = handle.scan();

        console::step(2, "Connecting...");
        let target = self.address.clone().or_else(|| devices.first().map(|d| d.address.clone()));
        let connected = match &target {
            Some(address) => handle.connect_to_device(address),
            None => handle.connect(),
        };
        connected.context("Connect failed")?;
        println!(
            "Connection status: {}",
            if handle.is_connected() { "Connected" } else { "Not Connected" }
        );

        match role {
            DeviceRole::SignalAnalyzer => exercise_analyzer(&handle)?,
            DeviceRole::SignalGenerator => exercise_generator(&handle)?,
            DeviceRole::Positioner => exercise_positioner(&handle, &config.motion_config())?,
        }

        console::step(9, "Disconnecting...");
        handle.disconnect()?;

        console::banner(&format!("{} Test Complete!", role));
        Ok(())
    }
}

fn exercise_analyzer(handle: &DeviceHandle) -> Result<()> {
    let analyzer = handle.analyzer().context("Not a signal analyzer")?;

    console::step(3, "Configuring analyzer (2.0-3.0 GHz, RBW 100 kHz)...");
    analyzer.set_start_frequency(2.0e9)?;
    analyzer.set_stop_frequency(3.0e9)?;
    analyzer.set_rbw(100e3)?;

    for index in [4, 5] {
        console::step(index, "Finding peak...");
        let peak = analyzer.find_peak();
        println!(
            "Peak found: {:.3} MHz, {:.2} dBm",
            peak.frequency_hz / 1e6,
            peak.level_dbm
        );
    }
    Ok(())
}

fn exercise_generator(handle: &DeviceHandle) -> Result<()> {
    let generator = handle.generator().context("Not a signal generator")?;
    let rf_status = || if generator.is_output_enabled() { "ON" } else { "OFF" };

    console::step(3, "Setting frequency to 5.5 GHz...");
    generator.set_frequency(5.5e9)?;

    console::step(4, "Setting power to -10 dBm...");
    generator.set_power(-10.0)?;

    console::step(5, "Enabling RF output...");
    generator.enable_output()?;
    println!("RF Status: {}", rf_status());

    thread::sleep(Duration::from_millis(500));

    console::step(6, "Disabling RF output...");
    generator.disable_output()?;
    println!("RF Status: {}", rf_status());
    Ok(())
}

fn exercise_positioner(handle: &DeviceHandle, motion: &MotionConfig) -> Result<()> {
    let positioner = handle.positioner().context("Not a positioner")?;
    let never = AtomicBool::new(false);

    console::step(3, "Starting AZ/EL open-loop movement...");
    positioner.set_movement(
        AxisMap::splat(Direction::Hold)
            .with(Axis::Az, Direction::Forward)
            .with(Axis::El, Direction::Forward),
    );
    positioner.start_motion()?;

    // 运行 2 秒后停止（或先到达限位 / tick 上限）
    let outcome = wait_for_motion(positioner, motion, &never, Some(Duration::from_secs(2)));
    console::step(4, "Stopping movement...");
    if outcome == WaitOutcome::Finished {
        println!("Movement already finished");
    }
    positioner.stop_motion();
    println!("Position: {}", positioner.position());

    console::step(5, "Moving to home position...");
    positioner.move_to(0.0, 0.0, None)?;
    wait_for_motion(positioner, motion, &never, Some(Duration::from_secs(60)));
    println!("Position: {}", positioner.position());
    Ok(())
}
