//! 设备会话（连接生命周期状态机）
//!
//! 三类设备共用同一个会话实现，角色相关的行为（打开链路、下发缓存设置、
//! 断开前停止运动 / 关闭射频）由设备层在 `begin_*` 与 `finish_*` 之间完成。
//!
//! # 调用约定
//!
//! ```text
//! connect:    begin_connect()?  →  打开链路  →  finish_connect(addr) | abort_connect(err)
//! disconnect: begin_disconnect() →  停止运动 / 关闭输出 / 关闭链路  →  finish_disconnect()
//! ```

use crate::hooks::EventSink;
use crate::state::{AtomicConnectionState, ConnectionState};
use antenna_types::{DeviceError, DeviceRole};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing::{debug, info, warn};

/// 设备会话
#[derive(Debug)]
pub struct DeviceSession {
    role: DeviceRole,
    state: AtomicConnectionState,
    address: Mutex<Option<String>>,
    events: Arc<EventSink>,
}

impl DeviceSession {
    /// 创建会话（初始为 Disconnected）
    pub fn new(role: DeviceRole, events: Arc<EventSink>) -> Self {
        Self {
            role,
            state: AtomicConnectionState::new(ConnectionState::Disconnected),
            address: Mutex::new(None),
            events,
        }
    }

    /// 设备角色
    pub fn role(&self) -> DeviceRole {
        self.role
    }

    /// 事件出口
    pub fn events(&self) -> &Arc<EventSink> {
        &self.events
    }

    /// 当前连接状态
    pub fn state(&self) -> ConnectionState {
        self.state.get(Ordering::Acquire)
    }

    /// 是否已连接（纯读，无阻塞）
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// 当前连接地址
    pub fn address(&self) -> Option<String> {
        self.address.lock().clone()
    }

    /// 上报错误：触发 error 事件并返回该错误
    pub fn report(&self, err: DeviceError) -> DeviceError {
        warn!(role = self.role.short_name(), "{}", err);
        self.events.error.emit(&err);
        err
    }

    /// 开始连接：Disconnected → Connecting
    ///
    /// 已连接或正在切换时返回错误（不触发事件，由调用方决定是否上报）。
    pub fn begin_connect(&self) -> Result<(), DeviceError> {
        match self
            .state
            .transition(ConnectionState::Disconnected, ConnectionState::Connecting)
        {
            Ok(_) => {
                debug!(role = self.role.short_name(), "Connecting");
                Ok(())
            },
            Err(ConnectionState::Connected) => Err(DeviceError::AlreadyConnected {
                role: self.role,
                address: self.address().unwrap_or_default(),
            }),
            Err(_) => Err(DeviceError::ConnectInProgress { role: self.role }),
        }
    }

    /// 连接成功：记录地址，Connecting → Connected，触发 connected
    pub fn finish_connect(&self, address: String) {
        info!(role = self.role.short_name(), %address, "Connected to {}", self.role);
        *self.address.lock() = Some(address.clone());
        self.state.set(ConnectionState::Connected, Ordering::Release);
        self.events.connected.emit(address.as_str());
    }

    /// 连接失败：回到 Disconnected，触发 error
    pub fn abort_connect(&self, err: DeviceError) -> DeviceError {
        self.state.set(ConnectionState::Disconnected, Ordering::Release);
        self.report(err)
    }

    /// 开始断开：Connected → Disconnecting
    ///
    /// 未连接时仅记录警告并返回 `false`（空操作）。
    pub fn begin_disconnect(&self) -> bool {
        match self
            .state
            .transition(ConnectionState::Connected, ConnectionState::Disconnecting)
        {
            Ok(_) => true,
            Err(state) => {
                warn!(
                    role = self.role.short_name(),
                    ?state,
                    "{} not connected, nothing to disconnect",
                    self.role
                );
                false
            },
        }
    }

    /// 断开完成：清除地址，Disconnecting → Disconnected，触发 disconnected
    pub fn finish_disconnect(&self) {
        let address = self.address.lock().take();
        self.state.set(ConnectionState::Disconnected, Ordering::Release);
        info!(
            role = self.role.short_name(),
            address = address.as_deref().unwrap_or(""),
            "Disconnected from {}",
            self.role
        );
        self.events.disconnected.emit(&());
    }

    /// 要求已连接；否则触发一次 error 事件并返回 `NotConnected`
    pub fn require_connected(&self, operation: &'static str) -> Result<(), DeviceError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(self.report(DeviceError::NotConnected {
                role: self.role,
                operation,
            }))
        }
    }
}
