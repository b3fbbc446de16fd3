//! 连接状态与运动阶段（原子版本，用于线程间共享）
//!
//! `is_connected()` / `is_moving()` 必须是纯读、无阻塞的，
//! 因此状态保存在 `AtomicU8` 中，转换通过 CAS 完成。

use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::sync::atomic::{AtomicU8, Ordering};

/// 连接状态
///
/// ```text
/// Disconnected ──connect──▶ Connecting ──ok──▶ Connected
///      ▲                        │                  │
///      └─────────fail───────────┘            disconnect
///      │                                           ▼
///      └──────────────────────────────────── Disconnecting
/// ```
///
/// `Disconnecting` 是过渡状态：断开前先停止运动 / 关闭射频输出，
/// 期间新的 connect 请求被拒绝。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum ConnectionState {
    /// 未连接（默认）
    #[default]
    Disconnected = 0,
    /// 正在连接
    Connecting = 1,
    /// 已连接
    Connected = 2,
    /// 正在断开
    Disconnecting = 3,
}

impl ConnectionState {
    /// 从 u8 转换，无效值视为 Disconnected
    pub fn from_u8(value: u8) -> Self {
        Self::try_from(value).unwrap_or_default()
    }

    /// 是否已连接
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }

    /// 是否处于过渡状态
    pub fn is_transitioning(self) -> bool {
        matches!(self, Self::Connecting | Self::Disconnecting)
    }
}

/// 原子连接状态
#[derive(Debug, Default)]
pub struct AtomicConnectionState {
    inner: AtomicU8,
}

impl AtomicConnectionState {
    /// 创建
    pub fn new(state: ConnectionState) -> Self {
        Self {
            inner: AtomicU8::new(state.into()),
        }
    }

    /// 读取当前状态
    pub fn get(&self, ordering: Ordering) -> ConnectionState {
        ConnectionState::from_u8(self.inner.load(ordering))
    }

    /// 设置状态
    pub fn set(&self, state: ConnectionState, ordering: Ordering) {
        self.inner.store(state.into(), ordering);
    }

    /// 比较并交换
    ///
    /// # 返回
    ///
    /// 成功返回 `Ok(current)`，失败返回 `Err(实际状态)`
    pub fn transition(
        &self,
        current: ConnectionState,
        new: ConnectionState,
    ) -> Result<ConnectionState, ConnectionState> {
        self.inner
            .compare_exchange(current.into(), new.into(), Ordering::AcqRel, Ordering::Acquire)
            .map(ConnectionState::from_u8)
            .map_err(ConnectionState::from_u8)
    }
}

/// 运动阶段（嵌套在 Connected 内）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum MotionPhase {
    /// 空闲（默认）
    #[default]
    Idle = 0,
    /// 运动中（存在驱动任务）
    Moving = 1,
}

/// 原子运动阶段
#[derive(Debug, Default)]
pub struct AtomicMotionPhase {
    inner: AtomicU8,
}

impl AtomicMotionPhase {
    /// 读取
    pub fn get(&self) -> MotionPhase {
        MotionPhase::try_from(self.inner.load(Ordering::Acquire)).unwrap_or_default()
    }

    /// 设置
    pub fn set(&self, phase: MotionPhase) {
        self.inner.store(phase.into(), Ordering::Release);
    }
}
