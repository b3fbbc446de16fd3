//! 事件录制器
//!
//! 把 [`EventSink`] 的所有钩子接到一个无界 Channel 上，按触发顺序得到
//! 统一的 [`DeviceEvent`] 序列。主要用于测试事件顺序和控制台输出。
//!
//! # 使用示例
//!
//! ```rust
//! use antenna_driver::hooks::EventSink;
//! use antenna_driver::recording::{DeviceEvent, EventRecorder};
//!
//! let events = EventSink::new();
//! let (recorder, rx) = EventRecorder::new();
//! recorder.attach(&events);
//!
//! events.disconnected.emit(&());
//! assert_eq!(rx.try_recv().unwrap(), DeviceEvent::Disconnected);
//! ```
//!
//! `attach()` 会替换已设置的回调。

use crate::hooks::EventSink;
use antenna_types::{DeviceDescriptor, DeviceError, MotionMode, MotionSummary, PositionState, SpectralPeak};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// 录制的事件
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    Connected(String),
    Disconnected,
    Error(DeviceError),
    DevicesFound(Vec<DeviceDescriptor>),
    PeakFound(SpectralPeak),
    OutputEnabled,
    OutputDisabled,
    MotionStarted(MotionMode),
    MotionStopped(MotionSummary),
    PositionChanged(PositionState),
}

impl DeviceEvent {
    /// 事件类别名（日志/断言使用）
    pub fn kind(&self) -> &'static str {
        match self {
            DeviceEvent::Connected(_) => "connected",
            DeviceEvent::Disconnected => "disconnected",
            DeviceEvent::Error(_) => "error",
            DeviceEvent::DevicesFound(_) => "devices-found",
            DeviceEvent::PeakFound(_) => "peak-found",
            DeviceEvent::OutputEnabled => "output-enabled",
            DeviceEvent::OutputDisabled => "output-disabled",
            DeviceEvent::MotionStarted(_) => "motion-started",
            DeviceEvent::MotionStopped(_) => "motion-stopped",
            DeviceEvent::PositionChanged(_) => "position-changed",
        }
    }
}

/// 事件录制器
///
/// 接收端被丢弃后，发送失败会被静默忽略，不影响设备本身。
#[derive(Clone)]
pub struct EventRecorder {
    tx: Sender<DeviceEvent>,
    /// 已录制的事件数
    event_counter: Arc<AtomicU64>,
}

impl EventRecorder {
    /// 创建录制器与接收端
    pub fn new() -> (Self, Receiver<DeviceEvent>) {
        let (tx, rx) = unbounded();
        (
            Self {
                tx,
                event_counter: Arc::new(AtomicU64::new(0)),
            },
            rx,
        )
    }

    /// 事件计数器
    pub fn event_counter(&self) -> &Arc<AtomicU64> {
        &self.event_counter
    }

    fn record(&self, event: DeviceEvent) {
        if self.tx.send(event).is_ok() {
            self.event_counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// 接到事件出口的所有钩子上
    pub fn attach(&self, events: &EventSink) {
        let r = self.clone();
        events.connected.set(move |address: &str| r.record(DeviceEvent::Connected(address.to_string())));
        let r = self.clone();
        events.disconnected.set(move |_| r.record(DeviceEvent::Disconnected));
        let r = self.clone();
        events.error.set(move |err: &DeviceError| r.record(DeviceEvent::Error(err.clone())));
        let r = self.clone();
        events
            .devices_found
            .set(move |devices: &[DeviceDescriptor]| r.record(DeviceEvent::DevicesFound(devices.to_vec())));
        let r = self.clone();
        events.peak_found.set(move |peak: &SpectralPeak| r.record(DeviceEvent::PeakFound(*peak)));
        let r = self.clone();
        events.output_enabled.set(move |_| r.record(DeviceEvent::OutputEnabled));
        let r = self.clone();
        events.output_disabled.set(move |_| r.record(DeviceEvent::OutputDisabled));
        let r = self.clone();
        events.motion_started.set(move |mode: &MotionMode| r.record(DeviceEvent::MotionStarted(*mode)));
        let r = self.clone();
        events
            .motion_stopped
            .set(move |summary: &MotionSummary| r.record(DeviceEvent::MotionStopped(*summary)));
        let r = self.clone();
        events
            .position_changed
            .set(move |pos: &PositionState| r.record(DeviceEvent::PositionChanged(*pos)));
    }
}
