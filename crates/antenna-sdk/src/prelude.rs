//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use antenna_sdk::prelude::*;
//! ```

// 设备与能力接口
pub use crate::devices::{
    Device, DeviceHandle, DeviceRegistry, Positioner, SIMULATED_ANALYZER, SIMULATED_GENERATOR, SIMULATED_POSITIONER,
    SignalAnalyzer, SignalGenerator, SimulatorProfile,
};

// 事件
pub use crate::driver::{DeviceEvent, EventRecorder, EventSink};

// 常用数据类型
pub use crate::types::{
    Axis, AxisMap, Direction, DeviceDescriptor, DeviceRole, MotionMode, MotionSummary, PositionState, SpectralPeak,
    StopReason,
};

// 错误类型
pub use crate::tools::ConfigError;
pub use crate::types::{DeviceError, ErrorKind};
