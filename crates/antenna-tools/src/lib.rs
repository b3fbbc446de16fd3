//! # Antenna Tools
//!
//! 应用层共享工具：测试场配置文件（TOML）。
//!
//! 配置段与运行时类型的对应关系：
//!
//! | 配置段 | 运行时类型 |
//! |--------|------------|
//! | `[motion]` | `MotionConfig` |
//! | `[positioner]` | `MotionSettings` |
//! | `[simulation]` | `SimulatedLatency` + 随机种子 |
//! | `[analyzer]` / `[generator]` | `SweepSettings` / `CarrierSettings` |
//!
//! `RangeConfig::simulator_profile()` 把整份配置转换为模拟设备的出厂参数。

pub mod config;

pub use config::{
    AnalyzerSection, AxisValues, ConfigError, GeneratorSection, MotionSection, PositionerSection, RangeConfig,
    RetargetSetting, SchedulerSetting, SimulationSection,
};
