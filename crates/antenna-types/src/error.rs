//! 错误类型定义
//!
//! 所有错误都不会以 panic 形式传播：设备层把它们转换成 error 事件，
//! 同时作为 `Result` 返回给调用方。

use crate::axis::Axis;
use crate::device::DeviceRole;
use thiserror::Error;

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 当前状态下操作非法（已连接时再连接、运动中再启动等），操作为空操作
    ProtocolMisuse,
    /// 操作需要已连接状态
    NotConnected,
    /// 参数不合法（限位倒置、步长为 0、目标越界）
    InvalidArgument,
    /// 底层链路（厂商 SDK / 传输）失败
    Link,
}

/// 设备层错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// 已连接时再次连接
    #[error("{role} already connected to {address}")]
    AlreadyConnected { role: DeviceRole, address: String },

    /// 连接正在进行中
    #[error("{role} connection already in progress")]
    ConnectInProgress { role: DeviceRole },

    /// 需要已连接状态
    #[error("{role} not connected (cannot {operation})")]
    NotConnected {
        role: DeviceRole,
        operation: &'static str,
    },

    /// 运动中再次启动
    #[error("Positioner already moving")]
    AlreadyMoving,

    /// 限位倒置（min > max）
    #[error("Invalid range on {axis}: min {min} > max {max}")]
    InvalidLimits { axis: Axis, min: f64, max: f64 },

    /// 被驱动轴的步长无效
    #[error("Invalid step on {axis}: {step} (must be finite and > 0)")]
    InvalidStep { axis: Axis, step: f64 },

    /// 闭环目标超出限位
    #[error("Target {target} on {axis} outside range [{min}, {max}]")]
    TargetOutOfRange {
        axis: Axis,
        target: f64,
        min: f64,
        max: f64,
    },

    /// 在运动回调内部发起运动控制
    #[error("Motion cannot be started from inside a motion callback")]
    ReentrantControl,

    /// 运动工作线程无法启动
    #[error("Motion worker failed: {0}")]
    Worker(String),

    /// 底层链路错误
    #[error("Link error: {0}")]
    Link(#[from] LinkError),
}

impl DeviceError {
    /// 错误类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeviceError::AlreadyConnected { .. }
            | DeviceError::ConnectInProgress { .. }
            | DeviceError::AlreadyMoving
            | DeviceError::ReentrantControl => ErrorKind::ProtocolMisuse,
            DeviceError::NotConnected { .. } => ErrorKind::NotConnected,
            DeviceError::InvalidLimits { .. }
            | DeviceError::InvalidStep { .. }
            | DeviceError::TargetOutOfRange { .. } => ErrorKind::InvalidArgument,
            DeviceError::Link(_) | DeviceError::Worker(_) => ErrorKind::Link,
        }
    }
}

/// 链路层错误（厂商 SDK、USB/LAN 传输等适配器返回）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// 找不到设备
    #[error("Device not found: {0}")]
    NotFound(String),

    /// 设备无法打开
    #[error("Cannot open device: {0}")]
    Open(String),

    /// 命令执行失败
    #[error("Command failed: {0}")]
    Command(String),

    /// 链路未打开
    #[error("Link not open")]
    NotOpen,

    /// 该链路不支持此操作
    #[error("Not supported by this link: {0}")]
    Unsupported(&'static str),
}
