//! 闭环移动命令
//!
//! 移动定位器到目标角度，到达目标、限位或 Ctrl-C 后断开

use super::{WaitOutcome, wait_for_motion};
use crate::console;
use antenna_sdk::{Device, DeviceRegistry, DeviceRole, RangeConfig};
use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// 移动命令参数
#[derive(Args, Debug)]
pub struct MoveCommand {
    /// 方位角（度）
    #[arg(long, allow_hyphen_values = true)]
    pub az: f64,

    /// 俯仰角（度）
    #[arg(long, allow_hyphen_values = true)]
    pub el: f64,

    /// 极化角（度，默认保持不变）
    #[arg(long, allow_hyphen_values = true)]
    pub pol: Option<f64>,

    /// 超时（秒）
    #[arg(long, default_value_t = 120)]
    pub timeout: u64,
}

impl MoveCommand {
    /// 检查目标角度
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("az", Some(self.az)), ("el", Some(self.el)), ("pol", self.pol)] {
            if let Some(value) = value
                && !value.is_finite()
            {
                anyhow::bail!("Invalid {} target: {}", name, value);
            }
        }
        Ok(())
    }

    pub fn execute(&self, config: &RangeConfig) -> Result<()> {
        self.validate()?;

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
        positioner
            .move_to(self.az, self.el, self.pol)
            .context("Move rejected")?;

        let outcome = wait_for_motion(
            positioner,
            &config.motion_config(),
            &interrupted,
            Some(Duration::from_secs(self.timeout)),
        );
        match outcome {
            WaitOutcome::Finished => println!("✅ Final position: {}", positioner.position()),
            WaitOutcome::Interrupted => println!("Interrupted at {}", positioner.position()),
            WaitOutcome::TimedOut => println!("⚠️ Timed out at {}", positioner.position()),
        }

        handle.disconnect()?;
        Ok(())
    }
}
