//! 仪器链路抽象
//!
//! 厂商 SDK、VISA、串口等具体传输都实现 [`InstrumentLink`]，
//! 设备层只通过这个 trait 与硬件交互，从而可以用模拟器替换真实仪器。

use antenna_types::{DeviceDescriptor, LinkError, SpectralPeak, SweepSettings};

/// 下发到仪器的单项设置
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Setting {
    /// 频谱仪起始频率（Hz）
    StartFrequency(f64),
    /// 频谱仪终止频率（Hz）
    StopFrequency(f64),
    /// 频谱仪分辨率带宽（Hz）
    ResolutionBandwidth(f64),
    /// 信号源载波频率（Hz）
    CarrierFrequency(f64),
    /// 信号源输出功率（dBm）
    OutputPower(f64),
    /// 信号源射频输出开关
    RfOutput(bool),
}

/// 仪器链路
///
/// 实现者只需保证方法本身是线程安全可移动的（`Send`）；
/// 设备层用互斥锁串行化所有调用。
pub trait InstrumentLink: Send {
    /// 枚举可用设备（不改变连接状态）
    fn discover(&mut self) -> Vec<DeviceDescriptor>;

    /// 打开链路
    ///
    /// `address` 为 `None` 时连接唯一的隐式设备。返回实际连接的地址。
    fn open(&mut self, address: Option<&str>) -> Result<String, LinkError>;

    /// 关闭链路（不会失败）
    fn close(&mut self);

    /// 下发一项设置
    fn apply(&mut self, setting: Setting) -> Result<(), LinkError>;

    /// 在给定扫频窗口内搜索峰值
    fn measure_peak(&mut self, sweep: &SweepSettings) -> Result<SpectralPeak, LinkError> {
        let _ = sweep;
        Err(LinkError::Unsupported("peak search"))
    }
}

impl<L: InstrumentLink + ?Sized> InstrumentLink for Box<L> {
    fn discover(&mut self) -> Vec<DeviceDescriptor> {
        (**self).discover()
    }

    fn open(&mut self, address: Option<&str>) -> Result<String, LinkError> {
        (**self).open(address)
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn apply(&mut self, setting: Setting) -> Result<(), LinkError> {
        (**self).apply(setting)
    }

    fn measure_peak(&mut self, sweep: &SweepSettings) -> Result<SpectralPeak, LinkError> {
        (**self).measure_peak(sweep)
    }
}
