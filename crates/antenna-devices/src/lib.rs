//! # Antenna Devices
//!
//! 天线测试场的三类仪器：频谱分析仪、信号源、定位器。
//!
//! ## 结构
//!
//! - `capability`: [`Device`] 生命周期接口与三个角色能力接口
//! - `analyzer` / `generator` / `positioner`: 基于任意 [`InstrumentLink`] 的通用实现
//! - `simulated`: 不接触硬件的模拟链路（设备目录、延迟、随机峰值、故障注入）
//! - `handle`: 按角色区分的 [`DeviceHandle`]
//! - `registry`: 实例级的插件工厂注册表
//!
//! ## 示例
//!
//! ```rust,no_run
//! use antenna_devices::{Device, DeviceRegistry, SimulatorProfile, SIMULATED_ANALYZER};
//!
//! let registry = DeviceRegistry::with_simulators(SimulatorProfile::default());
//! let handle = registry.create(SIMULATED_ANALYZER).unwrap();
//! handle.events().peak_found.set(|peak| println!("peak: {:?}", peak));
//!
//! handle.connect().unwrap();
//! let peak = handle.analyzer().unwrap().find_peak();
//! println!("{:.3} MHz", peak.frequency_hz / 1e6);
//! ```
//!
//! [`InstrumentLink`]: antenna_driver::InstrumentLink

pub mod analyzer;
pub mod capability;
pub mod generator;
pub mod handle;
mod linked;
pub mod positioner;
pub mod registry;
pub mod simulated;

#[cfg(test)]
mod testing;

pub use analyzer::AnalyzerDevice;
pub use capability::{Device, Positioner, SignalAnalyzer, SignalGenerator};
pub use generator::GeneratorDevice;
pub use handle::DeviceHandle;
pub use positioner::PositionerDevice;
pub use registry::{
    DeviceFactory, DeviceRegistry, RegistryError, SIMULATED_ANALYZER, SIMULATED_GENERATOR, SIMULATED_POSITIONER,
    SimulatorProfile,
};
pub use simulated::{LinkProbe, SimulatedLatency, SimulatedLink};
