//! 按角色区分的设备句柄
//!
//! 宿主通过 [`DeviceHandle`] 持有任意角色的设备：共同的生命周期操作直接在句柄上调用，
//! 角色专属操作先用 `analyzer()` / `generator()` / `positioner()` 取出能力接口。
//! 句柄被丢弃时设备随之断开并释放。

use crate::capability::{Device, Positioner, SignalAnalyzer, SignalGenerator};
use antenna_driver::hooks::EventSink;
use antenna_driver::state::ConnectionState;
use antenna_types::{DeviceDescriptor, DeviceError, DeviceRole};
use std::fmt;
use std::sync::Arc;

/// 设备句柄
pub enum DeviceHandle {
    /// 频谱分析仪
    Analyzer(Box<dyn SignalAnalyzer>),
    /// 信号源
    Generator(Box<dyn SignalGenerator>),
    /// 定位器
    Positioner(Box<dyn Positioner>),
}

macro_rules! dispatch {
    ($handle:expr, $device:ident => $body:expr) => {
        match $handle {
            DeviceHandle::Analyzer($device) => $body,
            DeviceHandle::Generator($device) => $body,
            DeviceHandle::Positioner($device) => $body,
        }
    };
}

impl DeviceHandle {
    /// 频谱分析仪能力（角色不符时为 None）
    pub fn analyzer(&self) -> Option<&dyn SignalAnalyzer> {
        match self {
            DeviceHandle::Analyzer(device) => Some(device.as_ref()),
            _ => None,
        }
    }

    /// 信号源能力（角色不符时为 None）
    pub fn generator(&self) -> Option<&dyn SignalGenerator> {
        match self {
            DeviceHandle::Generator(device) => Some(device.as_ref()),
            _ => None,
        }
    }

    /// 定位器能力（角色不符时为 None）
    pub fn positioner(&self) -> Option<&dyn Positioner> {
        match self {
            DeviceHandle::Positioner(device) => Some(device.as_ref()),
            _ => None,
        }
    }
}

impl Device for DeviceHandle {
    fn role(&self) -> DeviceRole {
        dispatch!(self, d => d.role())
    }

    fn events(&self) -> &Arc<EventSink> {
        dispatch!(self, d => d.events())
    }

    fn scan(&self) -> Vec<DeviceDescriptor> {
        dispatch!(self, d => d.scan())
    }

    fn connect(&self) -> Result<(), DeviceError> {
        dispatch!(self, d => d.connect())
    }

    fn connect_to_device(&self, address: &str) -> Result<(), DeviceError> {
        dispatch!(self, d => d.connect_to_device(address))
    }

    fn disconnect(&self) -> Result<(), DeviceError> {
        dispatch!(self, d => d.disconnect())
    }

    fn is_connected(&self) -> bool {
        dispatch!(self, d => d.is_connected())
    }

    fn connection_state(&self) -> ConnectionState {
        dispatch!(self, d => d.connection_state())
    }

    fn address(&self) -> Option<String> {
        dispatch!(self, d => d.address())
    }
}

impl fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("role", &self.role())
            .field("state", &self.connection_state())
            .field("address", &self.address())
            .finish()
    }
}
