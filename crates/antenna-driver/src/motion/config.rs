//! 运动控制配置

use antenna_types::{AxisMap, Direction, MotionLimits, MotionVector, StepSize};
use std::time::Duration;

/// 驱动任务的调度方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerKind {
    /// 专用工作线程，按 `tick_interval` 周期推进（默认）
    #[default]
    Thread,
    /// 协作式：宿主事件循环调用 `MotionController::tick()` 推进
    Cooperative,
}

/// 运动中再次 `move_to()` 的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetargetPolicy {
    /// 停止并等待旧运动结束（原因 `Superseded`），再开始新运动（默认）
    #[default]
    Preempt,
    /// 拒绝新目标（`AlreadyMoving`）
    Reject,
}

/// 运动控制配置
#[derive(Debug, Clone, PartialEq)]
pub struct MotionConfig {
    /// tick 周期（协作式调度下仅作为建议值）
    pub tick_interval: Duration,
    /// 开环运动的 tick 上限（0 表示不限）
    pub tick_ceiling: u32,
    /// 边界与目标比较的绝对容差
    pub epsilon: f64,
    /// 调度方式
    pub scheduler: SchedulerKind,
    /// 重定向策略
    pub retarget: RetargetPolicy,
    /// 单次运动的截止时间（None 表示不限）
    pub deadline: Option<Duration>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            tick_ceiling: 50,
            epsilon: 1e-9,
            scheduler: SchedulerKind::Thread,
            retarget: RetargetPolicy::Preempt,
            deadline: None,
        }
    }
}

/// 运动参数（步长、限位、方向向量、距离）
///
/// 运动中修改的参数在下一个 tick 生效。
#[derive(Debug, Clone, PartialEq)]
pub struct MotionSettings {
    /// 逐轴步长
    pub step: StepSize,
    /// 逐轴限位
    pub limits: MotionLimits,
    /// 开环方向向量
    pub vector: MotionVector,
    /// 测量距离（仅保存和上报，不参与运动计算）
    pub distance: f64,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            step: StepSize::factory(),
            limits: MotionLimits::default(),
            vector: AxisMap::splat(Direction::Hold),
            distance: 0.0,
        }
    }
}
