//! # 测试场配置
//!
//! 一个 TOML 文件描述运动控制、模拟器延迟和三类仪器的初始设置：
//!
//! ```toml
//! [motion]
//! tick_interval_ms = 100
//! tick_ceiling = 50
//! scheduler = "thread"
//! retarget = "preempt"
//!
//! [positioner.max]
//! az = 180.0
//! el = 45.0
//! # ...
//! ```
//!
//! 缺省的段和字段使用出厂值。

use antenna_devices::{SimulatedLatency, SimulatorProfile};
use antenna_driver::motion::{MotionConfig, MotionSettings, RetargetPolicy, SchedulerKind};
use antenna_types::{Axis, AxisMap, CarrierSettings, Direction, MotionLimits, StepSize, SweepSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 六轴数值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisValues {
    pub az: f64,
    pub el: f64,
    pub pol: f64,
    pub x: f64,
    pub y: f64,
    pub v: f64,
}

impl AxisValues {
    pub const fn new(values: [f64; 6]) -> Self {
        Self {
            az: values[0],
            el: values[1],
            pol: values[2],
            x: values[3],
            y: values[4],
            v: values[5],
        }
    }

    pub const fn to_map(self) -> AxisMap<f64> {
        AxisMap::new([self.az, self.el, self.pol, self.x, self.y, self.v])
    }
}

impl From<AxisMap<f64>> for AxisValues {
    fn from(map: AxisMap<f64>) -> Self {
        Self::new(*map.as_array())
    }
}

/// 调度方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerSetting {
    #[default]
    Thread,
    Cooperative,
}

/// 重定向策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetargetSetting {
    #[default]
    Preempt,
    Reject,
}

/// `[motion]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSection {
    /// tick 周期（ms）
    pub tick_interval_ms: u64,
    /// 开环 tick 上限（0 表示不限）
    pub tick_ceiling: u32,
    /// 比较容差
    pub epsilon: f64,
    pub scheduler: SchedulerSetting,
    pub retarget: RetargetSetting,
    /// 单次运动截止时间（ms）
    pub deadline_ms: Option<u64>,
}

impl Default for MotionSection {
    fn default() -> Self {
        let config = MotionConfig::default();
        Self {
            tick_interval_ms: config.tick_interval.as_millis() as u64,
            tick_ceiling: config.tick_ceiling,
            epsilon: config.epsilon,
            scheduler: SchedulerSetting::default(),
            retarget: RetargetSetting::default(),
            deadline_ms: None,
        }
    }
}

impl From<&MotionSection> for MotionConfig {
    fn from(section: &MotionSection) -> Self {
        MotionConfig {
            tick_interval: Duration::from_millis(section.tick_interval_ms),
            tick_ceiling: section.tick_ceiling,
            epsilon: section.epsilon,
            scheduler: match section.scheduler {
                SchedulerSetting::Thread => SchedulerKind::Thread,
                SchedulerSetting::Cooperative => SchedulerKind::Cooperative,
            },
            retarget: match section.retarget {
                RetargetSetting::Preempt => RetargetPolicy::Preempt,
                RetargetSetting::Reject => RetargetPolicy::Reject,
            },
            deadline: section.deadline_ms.map(Duration::from_millis),
        }
    }
}

/// `[simulation]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    pub scan_latency_ms: u64,
    pub connect_latency_ms: u64,
    pub output_latency_ms: u64,
    /// 峰值随机种子
    pub seed: Option<u64>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        let latency = SimulatedLatency::realistic();
        Self {
            scan_latency_ms: latency.scan.as_millis() as u64,
            connect_latency_ms: latency.connect.as_millis() as u64,
            output_latency_ms: latency.output.as_millis() as u64,
            seed: None,
        }
    }
}

impl From<&SimulationSection> for SimulatedLatency {
    fn from(section: &SimulationSection) -> Self {
        SimulatedLatency {
            scan: Duration::from_millis(section.scan_latency_ms),
            connect: Duration::from_millis(section.connect_latency_ms),
            output: Duration::from_millis(section.output_latency_ms),
        }
    }
}

/// `[positioner]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionerSection {
    pub step: AxisValues,
    pub min: AxisValues,
    pub max: AxisValues,
    /// 测量距离
    pub distance: f64,
}

impl Default for PositionerSection {
    fn default() -> Self {
        let limits = MotionLimits::default();
        Self {
            step: StepSize::factory().into(),
            min: limits.min.into(),
            max: limits.max.into(),
            distance: 0.0,
        }
    }
}

impl From<&PositionerSection> for MotionSettings {
    fn from(section: &PositionerSection) -> Self {
        MotionSettings {
            step: section.step.to_map(),
            limits: MotionLimits::new(section.min.to_map(), section.max.to_map()),
            vector: AxisMap::splat(Direction::Hold),
            distance: section.distance,
        }
    }
}

/// `[analyzer]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSection {
    pub start_hz: f64,
    pub stop_hz: f64,
    pub rbw_hz: f64,
}

impl Default for AnalyzerSection {
    fn default() -> Self {
        let sweep = SweepSettings::default();
        Self {
            start_hz: sweep.start_hz,
            stop_hz: sweep.stop_hz,
            rbw_hz: sweep.rbw_hz,
        }
    }
}

/// `[generator]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSection {
    pub frequency_hz: f64,
    pub power_dbm: f64,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        let carrier = CarrierSettings::default();
        Self {
            frequency_hz: carrier.frequency_hz,
            power_dbm: carrier.power_dbm,
        }
    }
}

/// 测试场配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    pub motion: MotionSection,
    pub simulation: SimulationSection,
    pub positioner: PositionerSection,
    pub analyzer: AnalyzerSection,
    pub generator: GeneratorSection,
}

impl RangeConfig {
    /// 从文件加载并校验
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// 解析 TOML 并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 保存到文件（父目录不存在时创建）
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// 校验
    ///
    /// # 错误
    ///
    /// - 任一轴 `min > max`
    /// - 步长为负或非有限值
    /// - tick 周期为 0，容差为负
    /// - 扫频窗口倒置或 RBW 非正
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.motion.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("motion.tick_interval_ms must be > 0".into()));
        }
        if !(self.motion.epsilon.is_finite() && self.motion.epsilon >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "motion.epsilon must be >= 0 (got {})",
                self.motion.epsilon
            )));
        }

        let step = self.positioner.step.to_map();
        let min = self.positioner.min.to_map();
        let max = self.positioner.max.to_map();
        for axis in Axis::ALL {
            if !(step[axis].is_finite() && step[axis] >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "positioner.step.{} must be >= 0 (got {})",
                    axis.name().to_lowercase(),
                    step[axis]
                )));
            }
        }
        MotionLimits::new(min, max)
            .validate()
            .map_err(|err| ConfigError::Invalid(format!("positioner: {}", err)))?;

        if self.analyzer.start_hz > self.analyzer.stop_hz {
            return Err(ConfigError::Invalid(format!(
                "analyzer.start_hz ({}) exceeds stop_hz ({})",
                self.analyzer.start_hz, self.analyzer.stop_hz
            )));
        }
        if self.analyzer.rbw_hz <= 0.0 {
            return Err(ConfigError::Invalid("analyzer.rbw_hz must be > 0".into()));
        }
        Ok(())
    }

    /// 运动控制配置
    pub fn motion_config(&self) -> MotionConfig {
        MotionConfig::from(&self.motion)
    }

    /// 定位器初始运动参数
    pub fn motion_settings(&self) -> MotionSettings {
        MotionSettings::from(&self.positioner)
    }

    /// 模拟设备出厂参数
    pub fn simulator_profile(&self) -> SimulatorProfile {
        SimulatorProfile {
            latency: SimulatedLatency::from(&self.simulation),
            seed: self.simulation.seed,
            motion: self.motion_config(),
            motion_settings: self.motion_settings(),
            sweep: SweepSettings {
                start_hz: self.analyzer.start_hz,
                stop_hz: self.analyzer.stop_hz,
                rbw_hz: self.analyzer.rbw_hz,
            },
            carrier: CarrierSettings {
                frequency_hz: self.generator.frequency_hz,
                power_dbm: self.generator.power_dbm,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_runtime_defaults() {
        let config = RangeConfig::default();
        assert_eq!(config.motion_config(), MotionConfig::default());
        assert_eq!(config.motion_settings(), MotionSettings::default());
        assert_eq!(config.simulator_profile(), SimulatorProfile::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = RangeConfig::from_toml_str(
            r#"
[motion]
tick_interval_ms = 20
scheduler = "cooperative"
retarget = "reject"

[positioner.max]
az = 90.0
el = 45.0
pol = 180.0
x = 100.0
y = 100.0
v = 100.0
"#,
        )
        .unwrap();

        let motion = config.motion_config();
        assert_eq!(motion.tick_interval, Duration::from_millis(20));
        assert_eq!(motion.tick_ceiling, 50);
        assert_eq!(motion.scheduler, SchedulerKind::Cooperative);
        assert_eq!(motion.retarget, RetargetPolicy::Reject);

        let settings = config.motion_settings();
        assert_eq!(settings.limits.max[Axis::El], 45.0);
        assert_eq!(settings.limits.min[Axis::El], -90.0);
        assert_eq!(config.analyzer, AnalyzerSection::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = RangeConfig::default();
        config.simulation.seed = Some(42);
        config.positioner.distance = 3.0;
        config.generator.power_dbm = -10.0;
        config.save_to_file(&path).unwrap();

        let loaded = RangeConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_validate_rejects_inverted_limits() {
        let mut config = RangeConfig::default();
        config.positioner.min.el = 10.0;
        config.positioner.max.el = -10.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().starts_with("Invalid config: positioner"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RangeConfig::default();
        config.motion.tick_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = RangeConfig::default();
        config.positioner.step.pol = -1.0;
        assert!(config.validate().unwrap_err().to_string().contains("positioner.step.pol"));

        let mut config = RangeConfig::default();
        config.analyzer.start_hz = 6.0e9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            RangeConfig::from_toml_str("[motion]\ntick_interval_ms = \"fast\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            RangeConfig::load_from_file("/nonexistent/antenna/config.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
