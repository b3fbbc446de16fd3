//! 设备能力接口
//!
//! 所有设备共享 [`Device`] 生命周期接口，再按角色扩展出三个能力接口。
//! 宿主只依赖这些 trait，不关心背后是真实仪器还是模拟器。
//!
//! 操作失败时既返回 `Err`，也触发一次 error 事件；
//! 仅通过事件驱动的宿主可以忽略返回值。

use antenna_driver::hooks::EventSink;
use antenna_driver::motion::MotionSettings;
use antenna_driver::state::ConnectionState;
use antenna_types::{
    Axis, AxisMap, CarrierSettings, DeviceDescriptor, DeviceError, DeviceRole, MotionVector, PositionState,
    SpectralPeak, StepSize, SweepSettings,
};
use std::sync::Arc;

/// 设备生命周期接口
pub trait Device: Send + Sync {
    /// 设备角色
    fn role(&self) -> DeviceRole;

    /// 事件出口（用于注册回调）
    fn events(&self) -> &Arc<EventSink>;

    /// 枚举可用设备，同时触发 devices-found
    fn scan(&self) -> Vec<DeviceDescriptor>;

    /// 连接隐式设备（已连接时为空操作）
    fn connect(&self) -> Result<(), DeviceError>;

    /// 按地址连接（已连接时拒绝并上报 `AlreadyConnected`）
    fn connect_to_device(&self, address: &str) -> Result<(), DeviceError>;

    /// 断开连接
    ///
    /// 先停止运动 / 关闭射频输出，再断开。未连接时仅记录警告。
    fn disconnect(&self) -> Result<(), DeviceError>;

    /// 是否已连接（纯读）
    fn is_connected(&self) -> bool;

    /// 当前连接状态
    fn connection_state(&self) -> ConnectionState;

    /// 当前连接地址
    fn address(&self) -> Option<String>;
}

/// 频谱分析仪
pub trait SignalAnalyzer: Device {
    /// 设置起始频率（Hz），离线时缓存
    fn set_start_frequency(&self, hz: f64) -> Result<(), DeviceError>;

    /// 设置终止频率（Hz），离线时缓存
    fn set_stop_frequency(&self, hz: f64) -> Result<(), DeviceError>;

    /// 设置分辨率带宽（Hz），离线时缓存
    fn set_rbw(&self, hz: f64) -> Result<(), DeviceError>;

    /// 当前扫频设置
    fn sweep_settings(&self) -> SweepSettings;

    /// 搜索峰值
    ///
    /// 未连接或测量失败时触发 error 并返回 [`SpectralPeak::none()`]。
    fn find_peak(&self) -> SpectralPeak;
}

/// 信号源
pub trait SignalGenerator: Device {
    /// 设置载波频率（Hz），离线时缓存
    fn set_frequency(&self, hz: f64) -> Result<(), DeviceError>;

    /// 设置输出功率（dBm），离线时缓存
    fn set_power(&self, dbm: f64) -> Result<(), DeviceError>;

    /// 当前载波设置
    fn carrier_settings(&self) -> CarrierSettings;

    /// 打开射频输出（幂等）
    fn enable_output(&self) -> Result<(), DeviceError>;

    /// 关闭射频输出（幂等）
    fn disable_output(&self) -> Result<(), DeviceError>;

    /// 射频输出是否打开
    fn is_output_enabled(&self) -> bool;
}

/// 定位器
pub trait Positioner: Device {
    /// 设置全部步长
    fn set_step(&self, step: StepSize);

    /// 设置单轴步长
    fn set_axis_step(&self, axis: Axis, step: f64);

    /// 设置下限
    fn set_min_range(&self, min: AxisMap<f64>);

    /// 设置上限
    fn set_max_range(&self, max: AxisMap<f64>);

    /// 设置开环方向向量
    fn set_movement(&self, vector: MotionVector);

    /// 设置测量距离
    fn set_distance(&self, distance: f64);

    /// 当前运动参数
    fn motion_settings(&self) -> MotionSettings;

    /// 开环运动
    fn start_motion(&self) -> Result<(), DeviceError>;

    /// 停止运动（同步；空闲时为空操作）
    fn stop_motion(&self);

    /// 闭环运动到角度位置
    fn move_to(&self, az: f64, el: f64, pol: Option<f64>) -> Result<(), DeviceError>;

    /// 当前位置快照
    fn position(&self) -> PositionState;

    /// 重设位置参考（回零 / 标定；仅空闲时，运动中返回 `AlreadyMoving`）
    fn set_position(&self, position: PositionState) -> Result<(), DeviceError>;

    /// 是否在运动
    fn is_moving(&self) -> bool;

    /// 协作式调度：推进一个 tick，返回运动是否仍在进行
    fn tick(&self) -> bool;
}
