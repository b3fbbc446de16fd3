//! 开环扫描命令
//!
//! 沿一个轴持续步进，直到限位、tick 上限或 Ctrl-C。

use super::{WaitOutcome, wait_for_motion};
use crate::console::{self, AxisArg};
use antenna_sdk::{Axis, AxisMap, Device, DeviceRegistry, DeviceRole, Direction, RangeConfig};
use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 开环扫描参数
#[derive(Args, Debug)]
pub struct SweepCommand {
    /// 驱动的轴
    #[arg(short, long, value_enum, default_value = "az")]
    pub axis: AxisArg,

    /// 反向运动
    #[arg(long)]
    pub reverse: bool,

    /// 步长（默认使用配置文件中的值）
    #[arg(short, long)]
    pub step: Option<f64>,
}

impl SweepCommand {
    pub fn execute(&self, config: &RangeConfig) -> Result<()> {
        let axis = Axis::from(self.axis);
        let direction = if self.reverse { Direction::Reverse } else { Direction::Forward };

        let interrupted = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&interrupted);
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
        })
        .context("Failed to install Ctrl-C handler")?;

        let registry = DeviceRegistry::with_simulators(config.simulator_profile());
        let handle = console::create_device(&registry, DeviceRole::Positioner)?;
        console::attach_printer(handle.events());
        let positioner = handle.positioner().context("Not a positioner")?;

        handle.connect()?;
        if let Some(step) = self.step {
            positioner.set_axis_step(axis, step);
        }
        positioner.set_movement(AxisMap::splat(Direction::Hold).with(axis, direction));

        println!("Sweeping {} ({:?}), press Ctrl-C to stop", axis, direction);
        positioner.start_motion()?;

        // tick 上限为 0 时可能永不结束，只能靠 Ctrl-C
        let outcome = wait_for_motion(positioner, &config.motion_config(), &interrupted, None);
        if outcome == WaitOutcome::Interrupted {
            println!("Interrupted");
        }
        println!("Final position: {}", positioner.position());

        handle.disconnect()?;
        Ok(())
    }
}
