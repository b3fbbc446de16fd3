//! 会话 + 链路
//!
//! 三类设备共用的连接流程：扫描、连接（打开链路后下发缓存设置）、
//! 断开（先由设备完成停机动作，再关闭链路）。
//!
//! 链路锁只在调用链路方法期间持有，触发事件前一定已释放，
//! 因此回调里可以再调用设备方法。
//!
//! 控制锁（可重入）串行化连接、断开和需要已连接状态的控制操作：
//! 检查连接状态与随后的动作之间不会插入一次断开。

use antenna_driver::hooks::EventSink;
use antenna_driver::link::{InstrumentLink, Setting};
use antenna_driver::DeviceSession;
use antenna_types::{DeviceDescriptor, DeviceError, DeviceRole};
use parking_lot::{Mutex, MutexGuard, ReentrantMutex, ReentrantMutexGuard};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 会话与链路
pub struct LinkedSession<L: InstrumentLink> {
    session: DeviceSession,
    link: Mutex<L>,
    control: ReentrantMutex<()>,
}

impl<L: InstrumentLink> LinkedSession<L> {
    /// 创建
    pub fn new(role: DeviceRole, link: L, events: Arc<EventSink>) -> Self {
        Self {
            session: DeviceSession::new(role, events),
            link: Mutex::new(link),
            control: ReentrantMutex::new(()),
        }
    }

    /// 会话
    pub fn session(&self) -> &DeviceSession {
        &self.session
    }

    /// 获取控制锁（同一线程可重入，回调里再调用设备方法不会死锁）
    pub fn control(&self) -> ReentrantMutexGuard<'_, ()> {
        self.control.lock()
    }

    /// 锁定链路
    pub fn link(&self) -> MutexGuard<'_, L> {
        self.link.lock()
    }

    /// 扫描设备并触发 devices-found
    pub fn scan(&self) -> Vec<DeviceDescriptor> {
        let role = self.session.role();
        info!("Scanning for {} devices...", role);
        let devices = self.link.lock().discover();
        info!("Found {} {} device(s)", devices.len(), role);
        for device in &devices {
            debug!("  {}", device);
        }
        self.session.events().devices_found.emit(&devices);
        devices
    }

    /// 连接
    ///
    /// - `address == None`：隐式设备；已连接时记录警告并返回 `Ok`
    /// - `address == Some(..)`：已连接时上报 `AlreadyConnected`
    ///
    /// 连接成功后调用 `configure` 下发缓存的设置。
    pub fn connect(&self, address: Option<&str>, configure: impl FnOnce()) -> Result<(), DeviceError> {
        let _control = self.control.lock();
        match self.session.begin_connect() {
            Ok(()) => {},
            Err(DeviceError::AlreadyConnected { .. }) if address.is_none() => {
                warn!("{} already connected", self.session.role());
                return Ok(());
            },
            Err(err) => return Err(self.session.report(err)),
        }

        match address {
            Some(address) => info!("Connecting to {} at {}...", self.session.role(), address),
            None => info!("Connecting to {}...", self.session.role()),
        }

        let opened = self.link.lock().open(address);
        match opened {
            Ok(resolved) => {
                self.session.finish_connect(resolved);
                configure();
                Ok(())
            },
            Err(err) => Err(self.session.abort_connect(err.into())),
        }
    }

    /// 断开：`quiesce` 在关闭链路前执行（停止运动、关闭射频）
    pub fn disconnect(&self, quiesce: impl FnOnce()) {
        let _control = self.control.lock();
        if !self.session.begin_disconnect() {
            return;
        }
        quiesce();
        self.link.lock().close();
        self.session.finish_disconnect();
    }

    /// 下发一项设置
    ///
    /// 未连接时只缓存（返回 `Ok`），连接后由 `configure` 统一下发。
    /// 下发失败时上报 error，缓存值保留。
    pub fn apply(&self, setting: Setting) -> Result<(), DeviceError> {
        if !self.session.is_connected() {
            debug!("{:?} cached until connected", setting);
            return Ok(());
        }
        let result = self.link.lock().apply(setting);
        result.map_err(|err| self.session.report(err.into()))
    }
}
