//! 驱动层
//!
//! 本 crate 提供三类仪器共用的运行时组件：
//! - 事件钩子（`EventSink`）：每种事件一个可独立设置的回调槽位
//! - 设备会话（`DeviceSession`）：连接生命周期状态机（原子状态，无阻塞读取）
//! - 仪器链路（`InstrumentLink`）：厂商 SDK / 模拟器的统一抽象
//! - 运动控制（`MotionController`）：开环 / 闭环步进、取消与 join、线程或协作式调度
//!
//! # 使用场景
//!
//! 适用于实现新的仪器适配器。大多数用户应该使用 `antenna-devices`
//! 提供的设备类型，或 `antenna-sdk` 门面。

pub mod hooks;
pub mod link;
pub mod motion;
pub mod recording;
mod session;
pub mod state;

pub use hooks::{Callback, EventSink, Hook};
pub use link::{InstrumentLink, Setting};
pub use motion::{MotionConfig, MotionController, MotionSettings, RetargetPolicy, SchedulerKind};
pub use recording::{DeviceEvent, EventRecorder};
pub use session::DeviceSession;
pub use state::{AtomicConnectionState, AtomicMotionPhase, ConnectionState, MotionPhase};
