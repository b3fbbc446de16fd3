//! 定位器运动控制
//!
//! - `config`: 调度方式、tick 周期 / 上限、容差、重定向策略，以及可实时修改的运动参数
//! - `plan`: 开环 / 闭环的逐 tick 规划（纯函数）
//! - `task`: 协作式取消令牌
//! - `controller`: 任务生命周期（启动、停止、join、协作式 tick）

pub mod config;
mod controller;
pub mod plan;
pub mod task;

pub use config::{MotionConfig, MotionSettings, RetargetPolicy, SchedulerKind};
pub use controller::MotionController;
pub use plan::{ClosedLoopPlan, OpenLoopPlan, TickOutcome};
pub use task::{CancelRequest, CancelToken};
