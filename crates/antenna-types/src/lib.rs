//! # Antenna Types
//!
//! 天线测试场仪器的数据模型（无硬件依赖）
//!
//! ## 模块
//!
//! - `axis`: 轴定义、逐轴映射、方向向量、限位、位置快照
//! - `device`: 设备角色、传输类型、设备描述符
//! - `measurement`: 频谱峰值、扫频与载波配置
//! - `motion`: 运动模式、停止原因、运动总结
//! - `error`: 设备层与链路层错误类型
//!
//! 本 crate 只包含纯数据结构，不持有线程、锁或回调。
//! 生命周期状态机与运动控制在 `antenna-driver` 中实现。

pub mod axis;
pub mod device;
pub mod error;
pub mod measurement;
pub mod motion;

// 重新导出常用类型
pub use axis::{Axis, AxisMap, Direction, MotionLimits, MotionVector, PositionState, StepSize};
pub use device::{DeviceDescriptor, DeviceRole, TransportKind};
pub use error::{DeviceError, ErrorKind, LinkError};
pub use measurement::{CarrierSettings, SpectralPeak, SweepSettings};
pub use motion::{MotionMode, MotionSummary, StopReason};
