//! 测试用链路：`close()` 停在闸门处，直到测试放行

use crate::simulated::{LinkProbe, SimulatedLatency, SimulatedLink};
use antenna_driver::link::{InstrumentLink, Setting};
use antenna_types::{DeviceDescriptor, DeviceRole, LinkError, SpectralPeak, SweepSettings};
use crossbeam_channel::{Receiver, Sender, bounded};

/// 关闭闸门：`entered` 在 `close()` 进入时收到通知，向 `release` 发送后放行
pub(crate) struct CloseGate {
    pub entered: Receiver<()>,
    pub release: Sender<()>,
}

/// 关闭时阻塞的模拟链路
pub(crate) struct GatedLink {
    inner: SimulatedLink,
    entered: Sender<()>,
    release: Receiver<()>,
}

impl GatedLink {
    pub fn new(role: DeviceRole) -> (Self, CloseGate) {
        let (entered_tx, entered_rx) = bounded(1);
        let (release_tx, release_rx) = bounded(1);
        let link = Self {
            inner: SimulatedLink::new(role).with_latency(SimulatedLatency::instant()),
            entered: entered_tx,
            release: release_rx,
        };
        let gate = CloseGate {
            entered: entered_rx,
            release: release_tx,
        };
        (link, gate)
    }

    pub fn probe(&self) -> LinkProbe {
        self.inner.probe()
    }
}

impl InstrumentLink for GatedLink {
    fn discover(&mut self) -> Vec<DeviceDescriptor> {
        self.inner.discover()
    }

    fn open(&mut self, address: Option<&str>) -> Result<String, LinkError> {
        self.inner.open(address)
    }

    fn close(&mut self) {
        let _ = self.entered.try_send(());
        let _ = self.release.recv();
        self.inner.close();
    }

    fn apply(&mut self, setting: Setting) -> Result<(), LinkError> {
        self.inner.apply(setting)
    }

    fn measure_peak(&mut self, sweep: &SweepSettings) -> Result<SpectralPeak, LinkError> {
        self.inner.measure_peak(sweep)
    }
}
