//! 频谱分析仪

use crate::capability::{Device, SignalAnalyzer};
use crate::linked::LinkedSession;
use antenna_driver::hooks::EventSink;
use antenna_driver::link::{InstrumentLink, Setting};
use antenna_driver::state::ConnectionState;
use antenna_types::{DeviceDescriptor, DeviceError, DeviceRole, SpectralPeak, SweepSettings};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// 频谱分析仪
///
/// 扫频设置始终缓存在设备内：离线时修改不会丢失，连接成功后统一下发。
pub struct AnalyzerDevice<L: InstrumentLink> {
    inner: LinkedSession<L>,
    sweep: Mutex<SweepSettings>,
}

impl<L: InstrumentLink> AnalyzerDevice<L> {
    /// 创建（默认扫频窗口 5460–5560 MHz，RBW 1 MHz）
    pub fn new(link: L) -> Self {
        Self::with_settings(link, SweepSettings::default(), Arc::new(EventSink::new()))
    }

    /// 指定初始扫频设置与事件出口
    pub fn with_settings(link: L, sweep: SweepSettings, events: Arc<EventSink>) -> Self {
        Self {
            inner: LinkedSession::new(DeviceRole::SignalAnalyzer, link, events),
            sweep: Mutex::new(sweep),
        }
    }

    fn apply_cached(&self) {
        let sweep = *self.sweep.lock();
        // 失败已通过 error 事件上报，连接保持
        let _ = self.inner.apply(Setting::StartFrequency(sweep.start_hz));
        let _ = self.inner.apply(Setting::StopFrequency(sweep.stop_hz));
        let _ = self.inner.apply(Setting::ResolutionBandwidth(sweep.rbw_hz));
    }
}

impl<L: InstrumentLink> Device for AnalyzerDevice<L> {
    fn role(&self) -> DeviceRole {
        DeviceRole::SignalAnalyzer
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
        self.inner.disconnect(|| {});
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

impl<L: InstrumentLink> SignalAnalyzer for AnalyzerDevice<L> {
    fn set_start_frequency(&self, hz: f64) -> Result<(), DeviceError> {
        self.sweep.lock().start_hz = hz;
        debug!("Start frequency set to {} Hz", hz);
        self.inner.apply(Setting::StartFrequency(hz))
    }

    fn set_stop_frequency(&self, hz: f64) -> Result<(), DeviceError> {
        self.sweep.lock().stop_hz = hz;
        debug!("Stop frequency set to {} Hz", hz);
        self.inner.apply(Setting::StopFrequency(hz))
    }

    fn set_rbw(&self, hz: f64) -> Result<(), DeviceError> {
        self.sweep.lock().rbw_hz = hz;
        debug!("RBW set to {} Hz", hz);
        self.inner.apply(Setting::ResolutionBandwidth(hz))
    }

    fn sweep_settings(&self) -> SweepSettings {
        *self.sweep.lock()
    }

    fn find_peak(&self) -> SpectralPeak {
        let _control = self.inner.control();
        let session = self.inner.session();
        if session.require_connected("find peak").is_err() {
            return SpectralPeak::none();
        }

        let sweep = self.sweep_settings();
        let measured = self.inner.link().measure_peak(&sweep);
        match measured {
            Ok(peak) => {
                info!(
                    "Peak found: {:.3} MHz @ {:.2} dBm",
                    peak.frequency_hz / 1e6,
                    peak.level_dbm
                );
                session.events().peak_found.emit(&peak);
                peak
            },
            Err(err) => {
                session.report(err.into());
                SpectralPeak::none()
            },
        }
    }
}

impl<L: InstrumentLink> Drop for AnalyzerDevice<L> {
    fn drop(&mut self) {
        if self.is_connected() {
            let _ = self.disconnect();
        }
    }
}
