//! 设备工厂注册表
//!
//! 每个注册表实例各自维护「插件名 → 工厂」映射，没有进程级全局状态。
//! `create()` 即创建入口，丢弃返回的 [`DeviceHandle`] 即销毁。

use crate::analyzer::AnalyzerDevice;
use crate::generator::GeneratorDevice;
use crate::handle::DeviceHandle;
use crate::positioner::PositionerDevice;
use crate::simulated::{SimulatedLatency, SimulatedLink};
use antenna_driver::hooks::EventSink;
use antenna_driver::motion::{MotionConfig, MotionSettings};
use antenna_types::{CarrierSettings, DeviceRole, SweepSettings};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// 内置模拟分析仪的插件名
pub const SIMULATED_ANALYZER: &str = "simulated-analyzer";
/// 内置模拟信号源的插件名
pub const SIMULATED_GENERATOR: &str = "simulated-generator";
/// 内置模拟定位器的插件名
pub const SIMULATED_POSITIONER: &str = "simulated-positioner";

/// 设备工厂（创建入口）
pub type DeviceFactory = Box<dyn Fn() -> DeviceHandle + Send + Sync>;

/// 注册表错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("Plugin already registered: {0}")]
    Duplicate(String),
}

/// 模拟设备的出厂参数
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorProfile {
    pub latency: SimulatedLatency,
    /// 峰值随机种子（None 表示每次随机）
    pub seed: Option<u64>,
    pub motion: MotionConfig,
    pub motion_settings: MotionSettings,
    pub sweep: SweepSettings,
    pub carrier: CarrierSettings,
}

impl Default for SimulatorProfile {
    fn default() -> Self {
        Self {
            latency: SimulatedLatency::realistic(),
            seed: None,
            motion: MotionConfig::default(),
            motion_settings: MotionSettings::default(),
            sweep: SweepSettings::default(),
            carrier: CarrierSettings::default(),
        }
    }
}

impl SimulatorProfile {
    fn link(&self, role: DeviceRole) -> SimulatedLink {
        let link = SimulatedLink::new(role).with_latency(self.latency);
        match self.seed {
            Some(seed) => link.with_seed(seed),
            None => link,
        }
    }

    /// 创建模拟设备
    pub fn build(&self, role: DeviceRole) -> DeviceHandle {
        let link = self.link(role);
        let events = Arc::new(EventSink::new());
        match role {
            DeviceRole::SignalAnalyzer => {
                DeviceHandle::Analyzer(Box::new(AnalyzerDevice::with_settings(link, self.sweep, events)))
            },
            DeviceRole::SignalGenerator => {
                DeviceHandle::Generator(Box::new(GeneratorDevice::with_settings(link, self.carrier, events)))
            },
            DeviceRole::Positioner => DeviceHandle::Positioner(Box::new(PositionerDevice::with_config(
                link,
                self.motion.clone(),
                self.motion_settings.clone(),
                events,
            ))),
        }
    }
}

struct Entry {
    role: DeviceRole,
    factory: DeviceFactory,
}

/// 设备工厂注册表
#[derive(Default)]
pub struct DeviceRegistry {
    entries: BTreeMap<String, Entry>,
}

impl DeviceRegistry {
    /// 空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 预先注册三个内置模拟设备
    pub fn with_simulators(profile: SimulatorProfile) -> Self {
        let mut registry = Self::new();
        let profile = Arc::new(profile);
        for (name, role) in [
            (SIMULATED_ANALYZER, DeviceRole::SignalAnalyzer),
            (SIMULATED_GENERATOR, DeviceRole::SignalGenerator),
            (SIMULATED_POSITIONER, DeviceRole::Positioner),
        ] {
            let profile = Arc::clone(&profile);
            registry.entries.insert(
                name.to_string(),
                Entry {
                    role,
                    factory: Box::new(move || profile.build(role)),
                },
            );
        }
        registry
    }

    /// 注册工厂
    ///
    /// # 错误
    ///
    /// 同名插件已存在时返回 `Duplicate`
    pub fn register<F>(&mut self, name: &str, role: DeviceRole, factory: F) -> Result<(), RegistryError>
    where
        F: Fn() -> DeviceHandle + Send + Sync + 'static,
    {
        if self.entries.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        debug!("Registered plugin '{}' ({})", name, role);
        self.entries.insert(
            name.to_string(),
            Entry {
                role,
                factory: Box::new(factory),
            },
        );
        Ok(())
    }

    /// 创建设备实例
    pub fn create(&self, name: &str) -> Result<DeviceHandle, RegistryError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| RegistryError::UnknownPlugin(name.to_string()))?;
        debug!("Creating device from plugin '{}'", name);
        Ok((entry.factory)())
    }

    /// 已注册的插件（按名称排序）
    pub fn plugins(&self) -> Vec<(&str, DeviceRole)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry.role)).collect()
    }

    /// 插件对应的角色
    pub fn role_of(&self, name: &str) -> Option<DeviceRole> {
        self.entries.get(name).map(|entry| entry.role)
    }

    /// 某个角色的第一个插件
    pub fn first_for(&self, role: DeviceRole) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.role == role)
            .map(|(name, _)| name.as_str())
    }
}
