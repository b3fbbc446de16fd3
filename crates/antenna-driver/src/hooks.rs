//! 事件钩子（EventSink）
//!
//! 每种事件一个独立的钩子槽位，可单独设置、替换、清除。
//!
//! # 投递语义
//!
//! - **同步**: 回调在触发方的线程上执行（调用方线程或运动任务线程）
//! - **有序**: 同一设备、同一类事件按触发顺序投递
//! - **因果**: 一次运动的 motion-stopped 总在最后一个 position-changed 之后
//!
//! 触发时先在读锁内克隆回调的 `Arc`，释放锁后再调用，
//! 因此回调内部可以安全地重新设置或清除钩子。
//!
//! # 使用示例
//!
//! ```rust
//! use antenna_driver::hooks::EventSink;
//! use antenna_types::PositionState;
//!
//! let events = EventSink::new();
//! events.position_changed.set(|pos: &PositionState| {
//!     println!("position: {}", pos);
//! });
//!
//! events.position_changed.emit(&PositionState::angular(1.0, 0.0, 0.0));
//! events.position_changed.clear();
//! ```

use antenna_types::{DeviceDescriptor, DeviceError, MotionMode, MotionSummary, PositionState, SpectralPeak};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// 回调类型
pub type Callback<A> = Arc<dyn Fn(&A) + Send + Sync>;

/// 单个事件槽位
pub struct Hook<A: ?Sized> {
    slot: RwLock<Option<Callback<A>>>,
}

impl<A: ?Sized> Hook<A> {
    /// 创建空槽位
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// 设置回调（替换已有回调）
    pub fn set<F>(&self, callback: F)
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        let callback: Callback<A> = Arc::new(callback);
        *self.slot.write() = Some(callback);
    }

    /// 设置已共享的回调
    pub fn set_shared(&self, callback: Callback<A>) {
        *self.slot.write() = Some(callback);
    }

    /// 清除回调
    pub fn clear(&self) {
        *self.slot.write() = None;
    }

    /// 是否已设置回调
    pub fn is_set(&self) -> bool {
        self.slot.read().is_some()
    }

    /// 触发事件（未设置回调时为空操作）
    pub fn emit(&self, payload: &A) {
        let callback = self.slot.read().clone();
        if let Some(callback) = callback {
            callback(payload);
        }
    }
}

impl<A: ?Sized> Default for Hook<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> fmt::Debug for Hook<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook").field("set", &self.is_set()).finish()
    }
}

/// 设备事件出口
///
/// 由设备实例持有（`Arc<EventSink>`），运动任务线程持有同一个 `Arc`。
#[derive(Debug, Default)]
pub struct EventSink {
    /// 已连接（载荷：连接地址）
    pub connected: Hook<str>,
    /// 已断开
    pub disconnected: Hook<()>,
    /// 操作失败（非致命，设备状态不变）
    pub error: Hook<DeviceError>,
    /// 扫描结果
    pub devices_found: Hook<[DeviceDescriptor]>,
    /// 频谱峰值
    pub peak_found: Hook<SpectralPeak>,
    /// 射频输出已打开
    pub output_enabled: Hook<()>,
    /// 射频输出已关闭
    pub output_disabled: Hook<()>,
    /// 运动开始
    pub motion_started: Hook<MotionMode>,
    /// 运动停止（每次运动恰好一次）
    pub motion_stopped: Hook<MotionSummary>,
    /// 位置更新（每个被接受的 tick 一次）
    pub position_changed: Hook<PositionState>,
}

impl EventSink {
    /// 创建空的事件出口（所有槽位未设置）
    pub fn new() -> Self {
        Self::default()
    }

    /// 清除所有钩子
    pub fn clear_all(&self) {
        self.connected.clear();
        self.disconnected.clear();
        self.error.clear();
        self.devices_found.clear();
        self.peak_found.clear();
        self.output_enabled.clear();
        self.output_disabled.clear();
        self.motion_started.clear();
        self.motion_stopped.clear();
        self.position_changed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn test_emit_without_callback_is_noop() {
        let events = EventSink::new();
        assert!(!events.peak_found.is_set());
        events.peak_found.emit(&SpectralPeak::none());
    }

    #[test]
    fn test_set_replace_clear() {
        let events = EventSink::new();
        let count = Arc::new(AtomicU64::new(0));

        let c = count.clone();
        events.disconnected.set(move |_| {
            c.fetch_add(1, Ordering::Relaxed);
        });
        events.disconnected.emit(&());
        assert_eq!(count.load(Ordering::Relaxed), 1);

        // 替换：旧回调不再被调用
        let c = count.clone();
        events.disconnected.set(move |_| {
            c.fetch_add(10, Ordering::Relaxed);
        });
        events.disconnected.emit(&());
        assert_eq!(count.load(Ordering::Relaxed), 11);

        events.disconnected.clear();
        events.disconnected.emit(&());
        assert_eq!(count.load(Ordering::Relaxed), 11);
    }

    #[test]
    fn test_hooks_are_independent() {
        let events = EventSink::new();
        let count = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        events.output_enabled.set(move |_| {
            c.fetch_add(1, Ordering::Relaxed);
        });

        events.output_disabled.emit(&());
        assert_eq!(count.load(Ordering::Relaxed), 0);
        assert!(!events.output_disabled.is_set());
    }

    #[test]
    fn test_callback_may_clear_itself() {
        let events = Arc::new(EventSink::new());
        let count = Arc::new(AtomicU64::new(0));

        let weak = Arc::downgrade(&events);
        let c = count.clone();
        events.connected.set(move |address: &str| {
            assert_eq!(address, "COM3");
            c.fetch_add(1, Ordering::Relaxed);
            if let Some(events) = weak.upgrade() {
                events.connected.clear();
            }
        });

        events.connected.emit("COM3");
        events.connected.emit("COM3");
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_clear_all() {
        let events = EventSink::new();
        events.error.set(|_| {});
        events.motion_stopped.set(|_| {});
        events.clear_all();
        assert!(!events.error.is_set());
        assert!(!events.motion_stopped.is_set());
    }
}
