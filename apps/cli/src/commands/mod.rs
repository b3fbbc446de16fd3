//! 命令定义和实现

pub mod config;
pub mod exercise;
pub mod r#move;
pub mod scan;
pub mod sweep;

pub use config::ConfigCommand;
pub use exercise::ExerciseCommand;
pub use r#move::MoveCommand;
pub use scan::ScanCommand;
pub use sweep::SweepCommand;

use antenna_sdk::{MotionConfig, Positioner, SchedulerKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// 运动结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Finished,
    Interrupted,
    TimedOut,
}

/// 等待运动结束
///
/// 协作式调度下由这里推进 tick。`interrupt` 被置位或超时时停止运动。
/// `timeout` 为 None 时不限时。
pub fn wait_for_motion(
    positioner: &dyn Positioner,
    config: &MotionConfig,
    interrupt: &AtomicBool,
    timeout: Option<Duration>,
) -> WaitOutcome {
    let deadline = timeout.and_then(|timeout| Instant::now().checked_add(timeout));
    let poll = config.tick_interval.min(Duration::from_millis(50));

    loop {
        if interrupt.load(Ordering::SeqCst) {
            positioner.stop_motion();
            return WaitOutcome::Interrupted;
        }
        if let Some(deadline) = deadline
            && Instant::now() >= deadline
        {
            positioner.stop_motion();
            return WaitOutcome::TimedOut;
        }

        match config.scheduler {
            SchedulerKind::Cooperative => {
                if !positioner.tick() {
                    return WaitOutcome::Finished;
                }
                thread::sleep(config.tick_interval);
            },
            SchedulerKind::Thread => {
                if !positioner.is_moving() {
                    return WaitOutcome::Finished;
                }
                thread::sleep(poll);
            },
        }
    }
}
