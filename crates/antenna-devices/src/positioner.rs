//! 定位器
//!
//! 连接管理走 [`LinkedSession`]，运动全部交给 [`MotionController`]。
//! 断开前同步停止运动，因此 motion-stopped 一定先于 disconnected。

use crate::capability::{Device, Positioner};
use crate::linked::LinkedSession;
use antenna_driver::hooks::EventSink;
use antenna_driver::link::InstrumentLink;
use antenna_driver::motion::{MotionConfig, MotionController, MotionSettings};
use antenna_driver::state::ConnectionState;
use antenna_types::{
    Axis, AxisMap, DeviceDescriptor, DeviceError, DeviceRole, MotionVector, PositionState, StepSize,
};
use std::sync::Arc;

/// 定位器
pub struct PositionerDevice<L: InstrumentLink> {
    inner: LinkedSession<L>,
    motion: MotionController,
}

impl<L: InstrumentLink> PositionerDevice<L> {
    /// 使用默认运动配置创建
    pub fn new(link: L) -> Self {
        Self::with_config(
            link,
            MotionConfig::default(),
            MotionSettings::default(),
            Arc::new(EventSink::new()),
        )
    }

    /// 指定运动配置、初始运动参数与事件出口
    pub fn with_config(link: L, config: MotionConfig, settings: MotionSettings, events: Arc<EventSink>) -> Self {
        Self {
            inner: LinkedSession::new(DeviceRole::Positioner, link, events.clone()),
            motion: MotionController::with_settings(config, settings, events),
        }
    }

    /// 运动控制器
    pub fn motion(&self) -> &MotionController {
        &self.motion
    }

    fn report<T>(&self, result: Result<T, DeviceError>) -> Result<T, DeviceError> {
        result.map_err(|err| self.inner.session().report(err))
    }

    /// 运动回调里不能取控制锁：持锁的断开可能正在等待这次运动结束
    fn guard_motion_context(&self) -> Result<(), DeviceError> {
        if self.motion.in_motion_context() {
            return self.report(Err(DeviceError::ReentrantControl));
        }
        Ok(())
    }
}

impl<L: InstrumentLink> Device for PositionerDevice<L> {
    fn role(&self) -> DeviceRole {
        DeviceRole::Positioner
    }

    fn events(&self) -> &Arc<EventSink> {
        self.inner.session().events()
    }

    fn scan(&self) -> Vec<DeviceDescriptor> {
        self.inner.scan()
    }

    fn connect(&self) -> Result<(), DeviceError> {
        self.guard_motion_context()?;
        self.inner.connect(None, || {})
    }

    fn connect_to_device(&self, address: &str) -> Result<(), DeviceError> {
        self.guard_motion_context()?;
        self.inner.connect(Some(address), || {})
    }

    fn disconnect(&self) -> Result<(), DeviceError> {
        self.guard_motion_context()?;
        self.inner.disconnect(|| self.motion.stop());
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

impl<L: InstrumentLink> Positioner for PositionerDevice<L> {
    fn set_step(&self, step: StepSize) {
        self.motion.set_step(step);
    }

    fn set_axis_step(&self, axis: Axis, step: f64) {
        self.motion.set_axis_step(axis, step);
    }

    fn set_min_range(&self, min: AxisMap<f64>) {
        self.motion.set_min_range(min);
    }

    fn set_max_range(&self, max: AxisMap<f64>) {
        self.motion.set_max_range(max);
    }

    fn set_movement(&self, vector: MotionVector) {
        self.motion.set_vector(vector);
    }

    fn set_distance(&self, distance: f64) {
        self.motion.set_distance(distance);
    }

    fn motion_settings(&self) -> MotionSettings {
        self.motion.settings()
    }

    fn start_motion(&self) -> Result<(), DeviceError> {
        self.guard_motion_context()?;
        let _control = self.inner.control();
        self.inner.session().require_connected("start motion")?;
        self.report(self.motion.start())
    }

    fn stop_motion(&self) {
        self.motion.stop();
    }

    fn move_to(&self, az: f64, el: f64, pol: Option<f64>) -> Result<(), DeviceError> {
        self.guard_motion_context()?;
        let _control = self.inner.control();
        self.inner.session().require_connected("move")?;
        self.report(self.motion.move_to(az, el, pol))
    }

    fn position(&self) -> PositionState {
        self.motion.position()
    }

    fn set_position(&self, position: PositionState) -> Result<(), DeviceError> {
        self.report(self.motion.set_position(position))
    }

    fn is_moving(&self) -> bool {
        self.motion.is_moving()
    }

    fn tick(&self) -> bool {
        self.motion.tick()
    }
}

impl<L: InstrumentLink> Drop for PositionerDevice<L> {
    fn drop(&mut self) {
        if self.is_connected() {
            let _ = self.disconnect();
        } else {
            self.motion.stop();
        }
    }
}
