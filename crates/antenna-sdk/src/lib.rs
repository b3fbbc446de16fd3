//! Antenna SDK - 天线测试场仪器 Rust SDK
//!
//! 为频谱分析仪、信号源和定位器提供统一的设备接口，
//! 真实仪器驱动与模拟器可以互换。
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **类型层** (`types`): 轴、限位、设备描述符、测量结果、错误（纯数据）
//! - **驱动层** (`driver`): 事件钩子、连接状态机、仪器链路抽象、运动控制
//! - **设备层** (`devices`): 三类设备、模拟链路、设备句柄、工厂注册表
//! - **工具层** (`tools`): TOML 配置文件
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use antenna_sdk::prelude::*;
//!
//! antenna_sdk::init_logger();
//!
//! let registry = DeviceRegistry::with_simulators(SimulatorProfile::default());
//! let handle = registry.create(SIMULATED_POSITIONER).unwrap();
//! handle.events().position_changed.set(|pos| println!("{}", pos));
//!
//! handle.connect().unwrap();
//! let positioner = handle.positioner().unwrap();
//! positioner.move_to(10.0, 5.0, None).unwrap();
//! ```

pub use antenna_devices as devices;
pub use antenna_driver as driver;
pub use antenna_tools as tools;
pub use antenna_types as types;

pub mod prelude;

// 设备层（推荐入口）
pub use antenna_devices::{
    Device, DeviceHandle, DeviceRegistry, Positioner, RegistryError, SIMULATED_ANALYZER, SIMULATED_GENERATOR,
    SIMULATED_POSITIONER, SignalAnalyzer, SignalGenerator, SimulatorProfile,
};

// 驱动层
pub use antenna_driver::{
    ConnectionState, DeviceEvent, EventRecorder, EventSink, MotionConfig, MotionSettings, RetargetPolicy,
    SchedulerKind,
};

// 类型层
pub use antenna_types::{
    Axis, AxisMap, Direction, DeviceDescriptor, DeviceError, DeviceRole, ErrorKind, MotionMode, MotionSummary,
    PositionState, SpectralPeak, StopReason,
};

// 配置
pub use antenna_tools::{ConfigError, RangeConfig};

use tracing_subscriber::EnvFilter;

/// 默认日志过滤规则
pub const DEFAULT_LOG_FILTER: &str = "info";

/// 初始化日志（`RUST_LOG` 优先，否则 `info`）
///
/// 返回是否由本次调用完成安装；已安装过全局 subscriber 时返回 `false`。
pub fn init_logger() -> bool {
    init_logger_with_filter(DEFAULT_LOG_FILTER)
}

/// 使用指定的过滤规则初始化日志（`RUST_LOG` 仍然优先）
///
/// 同时把 `log` crate 的记录转发到 `tracing`。
pub fn init_logger_with_filter(directives: &str) -> bool {
    // 已有 log 实现时忽略
    let _ = tracing_log::LogTracer::init();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).is_ok()
}
