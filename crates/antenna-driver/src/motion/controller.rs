//! 运动控制器
//!
//! 同一时刻最多一个驱动任务。任务可以运行在专用工作线程上，
//! 也可以由宿主事件循环通过 [`MotionController::tick()`] 协作式推进。
//!
//! # 停止语义
//!
//! `stop()` 是同步的：发出取消信号并等待任务结束（join），
//! 返回之后不会再有任何该次运动的事件。motion-stopped 对每次运动恰好触发一次：
//! 自然结束时由驱动任务触发，被取消时由取消方在 join 之后触发。
//!
//! # 在回调内部调用
//!
//! 运动事件回调运行在驱动任务的线程上。回调内调用 `stop()` 只设置取消标志
//! 并立即返回（不能 join 自己），驱动任务在回调返回后结束本次运动；
//! 回调内调用 `start()` / `move_to()` 返回 [`DeviceError::ReentrantControl`]。

use super::config::{MotionConfig, MotionSettings, RetargetPolicy, SchedulerKind};
use super::plan::{ClosedLoopPlan, OpenLoopPlan, TickOutcome};
use super::task::{self, ActiveRunGuard, CancelRequest, CancelToken};
use crate::hooks::EventSink;
use crate::state::{AtomicMotionPhase, MotionPhase};
use antenna_types::{
    Axis, AxisMap, DeviceError, MotionLimits, MotionMode, MotionSummary, MotionVector, PositionState, StepSize,
    StopReason,
};
use arc_swap::ArcSwap;
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

/// 控制器与驱动任务共享的状态
struct Shared {
    config: MotionConfig,
    settings: ArcSwap<MotionSettings>,
    position: ArcSwap<PositionState>,
    phase: AtomicMotionPhase,
    events: Arc<EventSink>,
}

impl Shared {
    /// 控制器标识（用于识别回调内的重入调用）
    fn id(&self) -> usize {
        self as *const Self as usize
    }

    fn position(&self) -> PositionState {
        **self.position.load()
    }
}

enum Plan {
    Open(OpenLoopPlan),
    Closed(ClosedLoopPlan),
}

/// 一次运动
struct MotionRun {
    mode: MotionMode,
    plan: Plan,
    ticks: u32,
    deadline: Option<Instant>,
    finished: bool,
    token: Arc<CancelToken>,
}

impl MotionRun {
    /// 执行一个 tick，返回运动是否仍在进行
    fn tick(&mut self, shared: &Shared) -> bool {
        if self.finished {
            return false;
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            self.finish(shared, StopReason::DeadlineExpired);
            return false;
        }

        let outcome = {
            let settings = shared.settings.load();
            let position = *shared.position().axes();
            let epsilon = shared.config.epsilon;
            match &mut self.plan {
                Plan::Open(plan) => plan.next(&position, &settings, self.ticks, epsilon),
                Plan::Closed(plan) => plan.next(&position, &settings, epsilon),
            }
        };

        match outcome {
            Ok(TickOutcome::Advance(next)) => {
                self.advance(shared, next);
                true
            },
            Ok(TickOutcome::AdvanceAndFinish(next, reason)) => {
                self.advance(shared, next);
                self.finish(shared, reason);
                false
            },
            Ok(TickOutcome::Halt(reason)) => {
                self.finish(shared, reason);
                false
            },
            Err(err) => {
                warn!("Motion settings became invalid: {}", err);
                shared.events.error.emit(&err);
                self.finish(shared, StopReason::InvalidSettings);
                false
            },
        }
    }

    fn advance(&mut self, shared: &Shared, next: AxisMap<f64>) {
        let position = PositionState::new(next);
        shared.position.store(Arc::new(position));
        self.ticks += 1;
        trace!(tick = self.ticks, "Position: {}", position);
        shared.events.position_changed.emit(&position);
    }

    /// 结束运动（幂等）：先回到 Idle，再触发 motion-stopped
    fn finish(&mut self, shared: &Shared, reason: StopReason) {
        if self.finished {
            return;
        }
        self.finished = true;
        shared.phase.set(MotionPhase::Idle);

        let summary = MotionSummary {
            mode: self.mode,
            reason,
            steps_taken: self.ticks,
            final_position: shared.position(),
        };
        info!(
            "Movement stopped ({}). Steps taken: {}, final position: {}",
            reason, summary.steps_taken, summary.final_position
        );
        shared.events.motion_stopped.emit(&summary);
    }
}

/// 工作线程主循环
fn worker_loop(mut run: MotionRun, shared: Arc<Shared>, wake: Receiver<()>) -> MotionRun {
    let _active = ActiveRunGuard::enter(shared.id(), run.token.clone());
    let interval = shared.config.tick_interval;

    loop {
        // 超时即到达下一个 tick；通道断开表示已被取消
        let _ = wake.recv_timeout(interval);

        match run.token.request() {
            CancelRequest::External => return run,
            CancelRequest::Internal => {
                run.finish(&shared, StopReason::Cancelled);
                return run;
            },
            CancelRequest::None => {},
        }

        if !run.tick(&shared) {
            return run;
        }

        if run.token.request() == CancelRequest::Internal {
            run.finish(&shared, StopReason::Cancelled);
            return run;
        }
    }
}

/// 驱动任务句柄
struct MotionTask {
    token: Arc<CancelToken>,
    /// 工作线程（协作式调度为 None，运动保存在控制器中）
    worker: Option<JoinHandle<MotionRun>>,
}

/// 运动控制器
///
/// # 示例
///
/// ```rust
/// use antenna_driver::hooks::EventSink;
/// use antenna_driver::motion::{MotionConfig, MotionController, SchedulerKind};
/// use antenna_types::{Axis, Direction};
/// use std::sync::Arc;
///
/// let config = MotionConfig {
///     scheduler: SchedulerKind::Cooperative,
///     ..MotionConfig::default()
/// };
/// let motion = MotionController::new(config, Arc::new(EventSink::new()));
/// motion.update_settings(|s| s.vector[Axis::Az] = Direction::Forward);
///
/// motion.start().unwrap();
/// while motion.tick() {}
/// assert_eq!(motion.position().az(), 50.0); // tick 上限 50
/// ```
pub struct MotionController {
    shared: Arc<Shared>,
    /// 当前任务（同时作为控制操作的互斥锁）
    task: Mutex<Option<MotionTask>>,
    /// 协作式调度下的当前运动
    pumped: Mutex<Option<MotionRun>>,
}

impl MotionController {
    /// 使用默认运动参数创建
    pub fn new(config: MotionConfig, events: Arc<EventSink>) -> Self {
        Self::with_settings(config, MotionSettings::default(), events)
    }

    /// 使用指定运动参数创建
    pub fn with_settings(config: MotionConfig, settings: MotionSettings, events: Arc<EventSink>) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                settings: ArcSwap::from_pointee(settings),
                position: ArcSwap::from_pointee(PositionState::default()),
                phase: AtomicMotionPhase::default(),
                events,
            }),
            task: Mutex::new(None),
            pumped: Mutex::new(None),
        }
    }

    /// 配置
    pub fn config(&self) -> &MotionConfig {
        &self.shared.config
    }

    /// 事件出口
    pub fn events(&self) -> &Arc<EventSink> {
        &self.shared.events
    }

    // ==================== 运动参数 ====================

    /// 当前运动参数快照
    pub fn settings(&self) -> MotionSettings {
        MotionSettings::clone(&self.shared.settings.load())
    }

    /// 修改运动参数（运动中在下一个 tick 生效）
    pub fn update_settings(&self, update: impl Fn(&mut MotionSettings)) {
        self.shared.settings.rcu(|current| {
            let mut next = MotionSettings::clone(current);
            update(&mut next);
            next
        });
    }

    /// 设置全部步长
    pub fn set_step(&self, step: StepSize) {
        debug!("Step set to {:?}", step.as_array());
        self.update_settings(|s| s.step = step);
    }

    /// 设置单轴步长
    pub fn set_axis_step(&self, axis: Axis, step: f64) {
        debug!("{} step set to {}", axis, step);
        self.update_settings(|s| s.step[axis] = step);
    }

    /// 设置限位
    pub fn set_limits(&self, limits: MotionLimits) {
        self.update_settings(|s| s.limits = limits);
    }

    /// 设置下限
    pub fn set_min_range(&self, min: AxisMap<f64>) {
        debug!("Min range set to {:?}", min.as_array());
        self.update_settings(|s| s.limits.min = min);
    }

    /// 设置上限
    pub fn set_max_range(&self, max: AxisMap<f64>) {
        debug!("Max range set to {:?}", max.as_array());
        self.update_settings(|s| s.limits.max = max);
    }

    /// 设置开环方向向量
    pub fn set_vector(&self, vector: MotionVector) {
        debug!("Movement vector set to {:?}", vector.as_array());
        self.update_settings(|s| s.vector = vector);
    }

    /// 设置测量距离
    pub fn set_distance(&self, distance: f64) {
        debug!("Distance set to {}", distance);
        self.update_settings(|s| s.distance = distance);
    }

    // ==================== 状态 ====================

    /// 当前位置快照
    pub fn position(&self) -> PositionState {
        self.shared.position()
    }

    /// 重设当前位置（仅空闲时，用于回零 / 标定）
    pub fn set_position(&self, position: PositionState) -> Result<(), DeviceError> {
        if self.in_motion_context() {
            return Err(DeviceError::ReentrantControl);
        }
        let _task = self.task.lock();
        if self.is_moving() {
            return Err(DeviceError::AlreadyMoving);
        }
        self.shared.position.store(Arc::new(position));
        Ok(())
    }

    /// 运动阶段
    pub fn phase(&self) -> MotionPhase {
        self.shared.phase.get()
    }

    /// 是否在运动（纯读）
    pub fn is_moving(&self) -> bool {
        self.phase() == MotionPhase::Moving
    }

    /// 当前线程是否处于本控制器的运动回调中
    pub fn in_motion_context(&self) -> bool {
        task::active_token(self.shared.id()).is_some()
    }

    // ==================== 运动控制 ====================

    /// 开环运动
    ///
    /// # 错误
    ///
    /// - `AlreadyMoving`: 已在运动（原运动不受影响）
    /// - `InvalidLimits` / `InvalidStep`: 参数无效
    /// - `ReentrantControl`: 在运动回调中调用
    pub fn start(&self) -> Result<(), DeviceError> {
        if self.in_motion_context() {
            return Err(DeviceError::ReentrantControl);
        }
        let mut task = self.task.lock();
        if self.is_moving() {
            return Err(DeviceError::AlreadyMoving);
        }

        let settings = self.shared.settings.load_full();
        settings.limits.validate()?;
        settings.step.validate_for(&settings.vector)?;

        self.halt(&mut task, StopReason::Cancelled);
        let plan = Plan::Open(OpenLoopPlan::new(self.shared.config.tick_ceiling));
        *task = Some(self.launch(MotionMode::OpenLoop, plan)?);
        Ok(())
    }

    /// 闭环运动到角度位置（`pol` 为 None 时保持当前极化角）
    ///
    /// 未指定的轴取抢占停止之后的实际位置，保持不动。
    pub fn move_to(&self, az: f64, el: f64, pol: Option<f64>) -> Result<(), DeviceError> {
        self.approach(|current| {
            current
                .with(Axis::Az, az)
                .with(Axis::El, el)
                .with(Axis::Pol, pol.unwrap_or(current[Axis::Pol]))
        })
    }

    /// 闭环运动到六轴位置
    ///
    /// 只有需要移动的轴按限位检查目标；运动中每个 tick 仍会重新检查（限位可被实时修改）。
    /// 已在运动时按 [`RetargetPolicy`] 处理。
    pub fn move_to_position(&self, target: AxisMap<f64>) -> Result<(), DeviceError> {
        self.approach(|_| target)
    }

    /// 由当前位置求目标并启动闭环运动
    fn approach(&self, target: impl Fn(&AxisMap<f64>) -> AxisMap<f64>) -> Result<(), DeviceError> {
        if self.in_motion_context() {
            return Err(DeviceError::ReentrantControl);
        }
        let mut task = self.task.lock();

        let settings = self.shared.settings.load_full();
        let epsilon = self.shared.config.epsilon;
        settings.limits.validate()?;
        let current = *self.position().axes();
        self.check_plan(&ClosedLoopPlan::new(&current, target(&current), epsilon), &settings)?;

        if self.is_moving() {
            match self.shared.config.retarget {
                RetargetPolicy::Reject => return Err(DeviceError::AlreadyMoving),
                RetargetPolicy::Preempt => {
                    debug!("Retargeting: stopping current movement");
                    self.halt(&mut task, StopReason::Superseded);
                },
            }
        } else {
            self.halt(&mut task, StopReason::Cancelled);
        }

        // 抢占后位置可能已变化
        let current = *self.position().axes();
        let plan = ClosedLoopPlan::new(&current, target(&current), epsilon);
        self.check_plan(&plan, &settings)?;

        info!("Moving to {}", PositionState::new(*plan.target()));
        *task = Some(self.launch(MotionMode::ClosedLoop, Plan::Closed(plan))?);
        Ok(())
    }

    /// 检查需要移动的轴：目标在限位内且步长有效
    fn check_plan(&self, plan: &ClosedLoopPlan, settings: &MotionSettings) -> Result<(), DeviceError> {
        let active = plan.active_axes();
        let limits = &settings.limits;
        for (axis, value) in plan.target().iter() {
            if active[axis].is_driving() && !limits.contains(axis, value, self.shared.config.epsilon) {
                return Err(DeviceError::TargetOutOfRange {
                    axis,
                    target: value,
                    min: limits.min[axis],
                    max: limits.max[axis],
                });
            }
        }
        settings.step.validate_for(&active)
    }

    /// 停止运动（同步）
    ///
    /// 空闲时为空操作。在运动回调内调用时只设置取消标志。
    pub fn stop(&self) {
        if let Some(token) = task::active_token(self.shared.id()) {
            debug!("Stop requested from motion callback");
            token.cancel_from_task();
            return;
        }
        let mut task = self.task.lock();
        self.halt(&mut task, StopReason::Cancelled);
    }

    /// 协作式调度：推进一个 tick
    ///
    /// 返回运动是否仍在进行。线程调度或空闲时返回 `false`。
    pub fn tick(&self) -> bool {
        let mut slot = self.pumped.lock();
        let Some(run) = slot.as_mut() else {
            return false;
        };
        let _active = ActiveRunGuard::enter(self.shared.id(), run.token.clone());

        let alive = match run.token.request() {
            // 取消方会取走并结束本次运动
            CancelRequest::External => return false,
            CancelRequest::Internal => {
                run.finish(&self.shared, StopReason::Cancelled);
                false
            },
            CancelRequest::None => {
                let alive = run.tick(&self.shared);
                if alive && run.token.request() == CancelRequest::Internal {
                    run.finish(&self.shared, StopReason::Cancelled);
                    false
                } else {
                    alive
                }
            },
        };

        if !alive {
            *slot = None;
        }
        alive
    }

    /// 启动驱动任务：进入 Moving，触发 motion-started
    fn launch(&self, mode: MotionMode, plan: Plan) -> Result<MotionTask, DeviceError> {
        let (token, wake) = CancelToken::new();
        let run = MotionRun {
            mode,
            plan,
            ticks: 0,
            deadline: self.shared.config.deadline.map(|d| Instant::now() + d),
            finished: false,
            token: token.clone(),
        };

        self.shared.phase.set(MotionPhase::Moving);
        info!("Movement started ({})", mode);
        {
            let _active = ActiveRunGuard::enter(self.shared.id(), token.clone());
            self.shared.events.motion_started.emit(&mode);
        }

        match self.shared.config.scheduler {
            SchedulerKind::Cooperative => {
                *self.pumped.lock() = Some(run);
                Ok(MotionTask { token, worker: None })
            },
            SchedulerKind::Thread => {
                let shared = self.shared.clone();
                thread::Builder::new()
                    .name("antenna-motion".to_string())
                    .spawn(move || worker_loop(run, shared, wake))
                    .map(|handle| MotionTask {
                        token,
                        worker: Some(handle),
                    })
                    .map_err(|e| {
                        error!("Failed to spawn motion worker: {}", e);
                        self.shared.phase.set(MotionPhase::Idle);
                        self.shared.events.motion_stopped.emit(&MotionSummary {
                            mode,
                            reason: StopReason::Cancelled,
                            steps_taken: 0,
                            final_position: self.position(),
                        });
                        DeviceError::Worker(e.to_string())
                    })
            },
        }
    }

    /// 取消并等待当前任务，必要时触发 motion-stopped
    ///
    /// 调用方必须持有 `task` 锁。
    fn halt(&self, slot: &mut Option<MotionTask>, reason: StopReason) {
        let Some(task) = slot.take() else {
            return;
        };
        task.token.cancel();

        let run = match task.worker {
            Some(handle) => match handle.join() {
                Ok(run) => Some(run),
                Err(_) => {
                    error!("Motion worker panicked");
                    self.shared.phase.set(MotionPhase::Idle);
                    None
                },
            },
            None => self.pumped.lock().take(),
        };

        if let Some(mut run) = run {
            let _active = ActiveRunGuard::enter(self.shared.id(), run.token.clone());
            run.finish(&self.shared, reason);
        }
    }
}

impl Drop for MotionController {
    fn drop(&mut self) {
        if self.in_motion_context() {
            warn!("Motion controller dropped from its own callback; worker left to finish");
            return;
        }
        let mut task = self.task.lock();
        self.halt(&mut task, StopReason::Cancelled);
    }
}
