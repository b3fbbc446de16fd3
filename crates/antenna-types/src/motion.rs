//! 运动模式与停止原因

use crate::axis::{Axis, PositionState};
use std::fmt;

/// 驱动模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MotionMode {
    /// 开环步进：按方向向量和步长逐 tick 前进，直到限位或 tick 上限
    OpenLoop,
    /// 闭环逼近：朝目标位置前进，每轴在一步之内时吸附到目标
    ClosedLoop,
}

impl fmt::Display for MotionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionMode::OpenLoop => f.write_str("open-loop"),
            MotionMode::ClosedLoop => f.write_str("closed-loop"),
        }
    }
}

/// 运动停止原因
///
/// 所有原因都是正常结束，不是错误：边界、目标、显式停止都通过同一个
/// motion-stopped 事件上报，由本枚举区分。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// 下一步会越过限位（该步整体被拒绝）
    BoundaryReached {
        /// 第一个越界的轴
        axis: Axis,
        /// 被拒绝的位置
        attempted: f64,
    },
    /// 开环 tick 上限（一次模拟扫描）
    TickCeiling {
        /// 已执行 tick 数
        ticks: u32,
    },
    /// 闭环运动所有轴已到达目标
    TargetReached,
    /// 显式 `stop()` 或断开连接
    Cancelled,
    /// 被新的 `move_to()` 取代
    Superseded,
    /// 超过运动截止时间
    DeadlineExpired,
    /// 运行中修改的限位或步长失效（同时上报 error 事件）
    InvalidSettings,
}

impl StopReason {
    /// 是否由调用方主动终止
    pub const fn is_requested(&self) -> bool {
        matches!(self, StopReason::Cancelled | StopReason::Superseded)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::BoundaryReached { axis, attempted } => {
                write!(f, "{} limit reached: {}", axis, attempted)
            },
            StopReason::TickCeiling { ticks } => write!(f, "movement completed ({} steps)", ticks),
            StopReason::TargetReached => f.write_str("target reached"),
            StopReason::Cancelled => f.write_str("cancelled"),
            StopReason::Superseded => f.write_str("superseded by a new target"),
            StopReason::DeadlineExpired => f.write_str("deadline expired"),
            StopReason::InvalidSettings => f.write_str("settings became invalid"),
        }
    }
}

/// 一次运动的总结（随 motion-stopped 事件上报）
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionSummary {
    /// 驱动模式
    pub mode: MotionMode,
    /// 停止原因
    pub reason: StopReason,
    /// 已接受的 tick 数（即 position-changed 事件数）
    pub steps_taken: u32,
    /// 最终位置
    pub final_position: PositionState,
}
