//! 信号源

use crate::capability::{Device, SignalGenerator};
use crate::linked::LinkedSession;
use antenna_driver::hooks::EventSink;
use antenna_driver::link::{InstrumentLink, Setting};
use antenna_driver::state::ConnectionState;
use antenna_types::{CarrierSettings, DeviceDescriptor, DeviceError, DeviceRole};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// 信号源
///
/// 射频开关是幂等的：重复打开 / 关闭不会再次触发事件。
/// 断开前总是先关闭射频输出。
pub struct GeneratorDevice<L: InstrumentLink> {
    inner: LinkedSession<L>,
    carrier: Mutex<CarrierSettings>,
    output: AtomicBool,
}

impl<L: InstrumentLink> GeneratorDevice<L> {
    /// 创建（默认 5510 MHz，0 dBm）
    pub fn new(link: L) -> Self {
        Self::with_settings(link, CarrierSettings::default(), Arc::new(EventSink::new()))
    }

    /// 指定初始载波设置与事件出口
    pub fn with_settings(link: L, carrier: CarrierSettings, events: Arc<EventSink>) -> Self {
        Self {
            inner: LinkedSession::new(DeviceRole::SignalGenerator, link, events),
            carrier: Mutex::new(carrier),
            output: AtomicBool::new(false),
        }
    }

    fn apply_cached(&self) {
        let carrier = *self.carrier.lock();
        let _ = self.inner.apply(Setting::CarrierFrequency(carrier.frequency_hz));
        let _ = self.inner.apply(Setting::OutputPower(carrier.power_dbm));
    }

    /// 关闭射频输出（不检查连接状态，断开流程中使用）
    ///
    /// 链路拒绝关闭时只记录错误，输出标志照常清除。
    fn switch_off(&self) {
        let result = {
            let mut link = self.inner.link();
            if !self.output.load(Ordering::Acquire) {
                None
            } else {
                let result = link.apply(Setting::RfOutput(false));
                self.output.store(false, Ordering::Release);
                Some(result)
            }
        };

        match result {
            None => debug!("RF output already disabled"),
            Some(result) => {
                if let Err(err) = result {
                    warn!("Failed to disable RF output: {}", err);
                }
                info!("RF output disabled");
                self.events().output_disabled.emit(&());
            },
        }
    }
}

impl<L: InstrumentLink> Device for GeneratorDevice<L> {
    fn role(&self) -> DeviceRole {
        DeviceRole::SignalGenerator
    }

    fn events(&self) -> &Arc<EventSink> {
        self.inner.session().events()
    }

    fn scan(&self) -> Vec<DeviceDescriptor> {
        self.inner.scan()
    }

    fn connect(&self) -> Result<(), DeviceError> {
        self.inner.connect(None, || self.apply_cached())
    }

    fn connect_to_device(&self, address: &str) -> Result<(), DeviceError> {
        self.inner.connect(Some(address), || self.apply_cached())
    }

    fn disconnect(&self) -> Result<(), DeviceError> {
        self.inner.disconnect(|| self.switch_off());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.inner.session().is_connected()
    }

    fn connection_state(&self) -> ConnectionState {
        self.inner.session().state()
    }

    fn address(&self) -> Option<String> {
        self.inner.session().address()
    }
}

impl<L: InstrumentLink> SignalGenerator for GeneratorDevice<L> {
    fn set_frequency(&self, hz: f64) -> Result<(), DeviceError> {
        self.carrier.lock().frequency_hz = hz;
        debug!("Frequency set to {} Hz", hz);
        self.inner.apply(Setting::CarrierFrequency(hz))
    }

    fn set_power(&self, dbm: f64) -> Result<(), DeviceError> {
        self.carrier.lock().power_dbm = dbm;
        debug!("Power set to {} dBm", dbm);
        self.inner.apply(Setting::OutputPower(dbm))
    }

    fn carrier_settings(&self) -> CarrierSettings {
        *self.carrier.lock()
    }

    fn enable_output(&self) -> Result<(), DeviceError> {
        let _control = self.inner.control();
        let session = self.inner.session();
        session.require_connected("enable RF output")?;

        let result = {
            let mut link = self.inner.link();
            if self.output.load(Ordering::Acquire) {
                None
            } else {
                let result = link.apply(Setting::RfOutput(true));
                if result.is_ok() {
                    self.output.store(true, Ordering::Release);
                }
                Some(result)
            }
        };

        match result {
            None => {
                debug!("RF output already enabled");
                Ok(())
            },
            Some(Ok(())) => {
                info!("RF output enabled");
                session.events().output_enabled.emit(&());
                Ok(())
            },
            Some(Err(err)) => Err(session.report(err.into())),
        }
    }

    fn disable_output(&self) -> Result<(), DeviceError> {
        let _control = self.inner.control();
        self.inner.session().require_connected("disable RF output")?;
        self.switch_off();
        Ok(())
    }

    fn is_output_enabled(&self) -> bool {
        self.output.load(Ordering::Acquire)
    }
}

impl<L: InstrumentLink> Drop for GeneratorDevice<L> {
    fn drop(&mut self) {
        if self.is_connected() {
            let _ = self.disconnect();
        }
    }
}
