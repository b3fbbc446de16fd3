//! 设备角色与发现结果

use std::fmt;

/// 设备角色（能力类别）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DeviceRole {
    /// 频谱分析仪
    SignalAnalyzer,
    /// 信号源
    SignalGenerator,
    /// 机械定位器（转台）
    Positioner,
}

impl DeviceRole {
    /// 全部角色
    pub const ALL: [DeviceRole; 3] = [
        DeviceRole::SignalAnalyzer,
        DeviceRole::SignalGenerator,
        DeviceRole::Positioner,
    ];

    /// 日志前缀中使用的短名
    pub const fn short_name(self) -> &'static str {
        match self {
            DeviceRole::SignalAnalyzer => "SA",
            DeviceRole::SignalGenerator => "SG",
            DeviceRole::Positioner => "Positioner",
        }
    }
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceRole::SignalAnalyzer => "Signal Analyzer",
            DeviceRole::SignalGenerator => "Signal Generator",
            DeviceRole::Positioner => "Positioner",
        };
        f.write_str(name)
    }
}

/// 连接方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransportKind {
    /// 以太网（IP 地址）
    Lan,
    /// USB（VISA 资源串或序列号）
    Usb,
    /// GPIB
    Gpib,
    /// 串口（COM / tty）
    Serial,
    /// 纯软件模拟
    Simulated,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportKind::Lan => "LAN",
            TransportKind::Usb => "USB",
            TransportKind::Gpib => "GPIB",
            TransportKind::Serial => "Serial",
            TransportKind::Simulated => "Simulated",
        };
        f.write_str(name)
    }
}

/// 设备描述符（发现结果，只读）
///
/// `address` 是 `connect_to_device()` 的输入：IP 地址、COM 口、USB 路径或序列号。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceDescriptor {
    /// 型号 / 显示名
    pub display_name: String,
    /// 序列号或唯一标识
    pub serial_id: String,
    /// 连接地址
    pub address: String,
    /// 连接方式
    pub transport: TransportKind,
    /// 是否可连接
    pub available: bool,
}

impl DeviceDescriptor {
    /// 创建一个可用的描述符
    pub fn new(
        display_name: impl Into<String>,
        serial_id: impl Into<String>,
        address: impl Into<String>,
        transport: TransportKind,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            serial_id: serial_id.into(),
            address: address.into(),
            transport,
            available: true,
        }
    }

    /// 标记为不可用（已被占用等）
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (SN: {}, Address: {}, {})",
            self.display_name, self.serial_id, self.address, self.transport
        )
    }
}
