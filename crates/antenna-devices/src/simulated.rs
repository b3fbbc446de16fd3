//! 模拟仪器链路
//!
//! 不接触任何硬件，按角色提供固定的设备目录、可配置的延迟、
//! 随机化的频谱峰值，以及用于测试的故障注入和设置记录（[`LinkProbe`]）。

use antenna_driver::link::{InstrumentLink, Setting};
use antenna_types::{DeviceDescriptor, DeviceRole, LinkError, SpectralPeak, SweepSettings, TransportKind};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// 模拟延迟
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedLatency {
    /// 扫描
    pub scan: Duration,
    /// 打开链路
    pub connect: Duration,
    /// 射频开关
    pub output: Duration,
}

impl SimulatedLatency {
    /// 接近真实仪器的延迟（扫描 200ms，连接 150ms，射频开关 50ms）
    pub const fn realistic() -> Self {
        Self {
            scan: Duration::from_millis(200),
            connect: Duration::from_millis(150),
            output: Duration::from_millis(50),
        }
    }

    /// 无延迟（测试用）
    pub const fn instant() -> Self {
        Self {
            scan: Duration::ZERO,
            connect: Duration::ZERO,
            output: Duration::ZERO,
        }
    }
}

impl Default for SimulatedLatency {
    fn default() -> Self {
        Self::realistic()
    }
}

/// 角色对应的模拟设备目录
pub fn catalogue(role: DeviceRole) -> Vec<DeviceDescriptor> {
    match role {
        DeviceRole::SignalAnalyzer => vec![
            DeviceDescriptor::new("SA-1000", "DSA-001234", "192.168.1.100", TransportKind::Lan),
            DeviceDescriptor::new("SA-2000", "DSA-005678", "192.168.1.101", TransportKind::Lan),
            DeviceDescriptor::new(
                "SA-USB",
                "DSA-USB-9012",
                "USB0::0x1234::0x5678::DSA-USB-9012::INSTR",
                TransportKind::Usb,
            ),
        ],
        DeviceRole::SignalGenerator => vec![
            DeviceDescriptor::new("SG-3000", "DSG-001122", "192.168.1.110", TransportKind::Lan),
            DeviceDescriptor::new("SG-5000", "DSG-003344", "192.168.1.111", TransportKind::Lan),
            DeviceDescriptor::new(
                "SG-USB",
                "DSG-USB-7890",
                "USB0::0x5678::0x1234::DSG-USB-7890::INSTR",
                TransportKind::Usb,
            ),
        ],
        DeviceRole::Positioner => vec![
            DeviceDescriptor::new(
                "Positioner-AZ/EL",
                "DPS-002468",
                "192.168.1.120",
                TransportKind::Lan,
            ),
            DeviceDescriptor::new("Positioner-6DOF", "DPS-SER-1357", "COM3", TransportKind::Serial),
        ],
    }
}

#[derive(Debug, Default)]
struct ProbeState {
    applied: Vec<Setting>,
    open_count: u32,
    fail_open: bool,
    fail_apply: bool,
    fail_output: bool,
}

/// 模拟链路的观测与故障注入句柄（与链路共享状态）
#[derive(Debug, Clone, Default)]
pub struct LinkProbe {
    state: Arc<Mutex<ProbeState>>,
}

impl LinkProbe {
    /// 已成功下发的设置（按顺序）
    pub fn applied(&self) -> Vec<Setting> {
        self.state.lock().applied.clone()
    }

    /// 清空设置记录
    pub fn clear_applied(&self) {
        self.state.lock().applied.clear();
    }

    /// 打开链路的次数
    pub fn open_count(&self) -> u32 {
        self.state.lock().open_count
    }

    /// 让后续 `open()` 失败
    pub fn fail_open(&self, fail: bool) {
        self.state.lock().fail_open = fail;
    }

    /// 让后续普通设置下发失败
    pub fn fail_apply(&self, fail: bool) {
        self.state.lock().fail_apply = fail;
    }

    /// 让后续射频开关失败
    pub fn fail_output(&self, fail: bool) {
        self.state.lock().fail_output = fail;
    }
}

/// 模拟链路
pub struct SimulatedLink {
    role: DeviceRole,
    catalogue: Vec<DeviceDescriptor>,
    latency: SimulatedLatency,
    rng: StdRng,
    open: Option<String>,
    probe: LinkProbe,
}

impl SimulatedLink {
    /// 创建（真实延迟，随机种子）
    pub fn new(role: DeviceRole) -> Self {
        Self {
            role,
            catalogue: catalogue(role),
            latency: SimulatedLatency::realistic(),
            rng: StdRng::from_entropy(),
            open: None,
            probe: LinkProbe::default(),
        }
    }

    /// 设置延迟
    #[must_use]
    pub fn with_latency(mut self, latency: SimulatedLatency) -> Self {
        self.latency = latency;
        self
    }

    /// 固定随机种子（峰值可复现）
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// 替换设备目录
    #[must_use]
    pub fn with_catalogue(mut self, catalogue: Vec<DeviceDescriptor>) -> Self {
        self.catalogue = catalogue;
        self
    }

    /// 观测句柄
    pub fn probe(&self) -> LinkProbe {
        self.probe.clone()
    }

    /// 链路是否打开
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn delay(duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }

    fn resolve(&self, address: Option<&str>) -> Result<String, LinkError> {
        match address {
            None => Ok(self
                .catalogue
                .first()
                .map(|d| d.address.clone())
                .unwrap_or_else(|| "SIMULATED".to_string())),
            Some(address) => self
                .catalogue
                .iter()
                .find(|d| d.available && (d.address == address || d.serial_id == address))
                .map(|d| d.address.clone())
                .ok_or_else(|| LinkError::NotFound(address.to_string())),
        }
    }
}

impl InstrumentLink for SimulatedLink {
    fn discover(&mut self) -> Vec<DeviceDescriptor> {
        Self::delay(self.latency.scan);
        self.catalogue.clone()
    }

    fn open(&mut self, address: Option<&str>) -> Result<String, LinkError> {
        Self::delay(self.latency.connect);
        let resolved = self.resolve(address)?;
        let mut probe = self.probe.state.lock();
        if probe.fail_open {
            return Err(LinkError::Open(resolved));
        }
        probe.open_count += 1;
        self.open = Some(resolved.clone());
        debug!(role = self.role.short_name(), "Simulated link open: {}", resolved);
        Ok(resolved)
    }

    fn close(&mut self) {
        if let Some(address) = self.open.take() {
            debug!(role = self.role.short_name(), "Simulated link closed: {}", address);
        }
    }

    fn apply(&mut self, setting: Setting) -> Result<(), LinkError> {
        if self.open.is_none() {
            return Err(LinkError::NotOpen);
        }
        let is_output = matches!(setting, Setting::RfOutput(_));
        if is_output {
            Self::delay(self.latency.output);
        }

        let mut probe = self.probe.state.lock();
        if (is_output && probe.fail_output) || (!is_output && probe.fail_apply) {
            return Err(LinkError::Command(format!("{:?} rejected", setting)));
        }
        probe.applied.push(setting);
        Ok(())
    }

    fn measure_peak(&mut self, sweep: &SweepSettings) -> Result<SpectralPeak, LinkError> {
        if self.role != DeviceRole::SignalAnalyzer {
            return Err(LinkError::Unsupported("peak search"));
        }
        if self.open.is_none() {
            return Err(LinkError::NotOpen);
        }
        // 中心频率 ±10% 扫宽，电平 -50 dBm ±10 dB
        let frequency_hz = sweep.center_hz() + self.rng.gen_range(-0.5..0.5_f64) * sweep.span_hz() * 0.2;
        let level_dbm = -50.0 + self.rng.gen_range(-0.5..0.5_f64) * 20.0;
        Ok(SpectralPeak::new(frequency_hz, level_dbm))
    }
}
