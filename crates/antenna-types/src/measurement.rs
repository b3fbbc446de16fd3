//! 测量相关数据：频谱峰值、扫频窗口、载波设置

/// 频谱峰值
///
/// 每次 `find_peak()` 产生一个，不在设备内保存。
///
/// 未能测量时返回 [`SpectralPeak::none()`]：电平为负无穷，
/// 任何真实读数（即使贴近噪底）都不会与之混淆。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpectralPeak {
    /// 峰值频率（Hz）
    pub frequency_hz: f64,
    /// 峰值电平（dBm）
    pub level_dbm: f64,
}

impl SpectralPeak {
    /// "未测量"哨兵电平
    pub const NO_MEASUREMENT_LEVEL_DBM: f64 = f64::NEG_INFINITY;

    /// 创建峰值
    pub const fn new(frequency_hz: f64, level_dbm: f64) -> Self {
        Self {
            frequency_hz,
            level_dbm,
        }
    }

    /// 哨兵峰值（未进行测量）
    pub const fn none() -> Self {
        Self::new(0.0, Self::NO_MEASUREMENT_LEVEL_DBM)
    }

    /// 是否为真实测量结果
    pub fn is_measured(&self) -> bool {
        self.level_dbm.is_finite()
    }
}

/// 频谱仪扫频设置（缓存值，连接后下发）
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SweepSettings {
    /// 起始频率（Hz）
    pub start_hz: f64,
    /// 终止频率（Hz）
    pub stop_hz: f64,
    /// 分辨率带宽 RBW（Hz）
    pub rbw_hz: f64,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            start_hz: 5460.0e6,
            stop_hz: 5560.0e6,
            rbw_hz: 1.0e6,
        }
    }
}

impl SweepSettings {
    /// 扫宽（Hz）
    pub fn span_hz(&self) -> f64 {
        self.stop_hz - self.start_hz
    }

    /// 中心频率（Hz）
    pub fn center_hz(&self) -> f64 {
        self.start_hz + self.span_hz() / 2.0
    }
}

/// 信号源载波设置（缓存值，连接后下发）
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarrierSettings {
    /// 载波频率（Hz）
    pub frequency_hz: f64,
    /// 输出功率（dBm）
    pub power_dbm: f64,
}

impl Default for CarrierSettings {
    fn default() -> Self {
        Self {
            frequency_hz: 5510.0e6,
            power_dbm: 0.0,
        }
    }
}
