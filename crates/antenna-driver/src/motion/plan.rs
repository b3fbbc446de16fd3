//! 运动规划（纯函数，不持有线程和锁）
//!
//! 每个 tick 由驱动任务调用一次 `next()`，根据当前位置和最新的运动参数
//! 计算下一步。参数在每个 tick 重新读取，因此运动中修改步长 / 限位
//! 会在下一个 tick 生效。

use super::config::MotionSettings;
use antenna_types::{Axis, AxisMap, DeviceError, Direction, MotionVector, StopReason};

/// 单个 tick 的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// 接受新位置，继续运动
    Advance(AxisMap<f64>),
    /// 接受新位置，随后结束运动
    AdvanceAndFinish(AxisMap<f64>, StopReason),
    /// 拒绝本 tick（位置不变），结束运动
    Halt(StopReason),
}

/// 开环步进
///
/// 每个 tick：`position += direction * step`。任何一个轴越界（按 AZ、EL、POL、X、Y、V
/// 的顺序检查，第一个越界的轴胜出）时，整个 tick 被拒绝并停止。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenLoopPlan {
    tick_ceiling: u32,
}

impl OpenLoopPlan {
    /// 创建开环规划（`tick_ceiling == 0` 表示不限）
    pub fn new(tick_ceiling: u32) -> Self {
        Self { tick_ceiling }
    }

    /// 计算下一步
    ///
    /// # 参数
    ///
    /// - `position`: 当前位置
    /// - `settings`: 最新的运动参数
    /// - `ticks_taken`: 已接受的 tick 数
    /// - `epsilon`: 边界容差
    ///
    /// # 错误
    ///
    /// 限位倒置或被驱动轴步长无效时返回错误（运动应终止）。
    pub fn next(
        &self,
        position: &AxisMap<f64>,
        settings: &MotionSettings,
        ticks_taken: u32,
        epsilon: f64,
    ) -> Result<TickOutcome, DeviceError> {
        settings.limits.validate()?;
        settings.step.validate_for(&settings.vector)?;

        let mut next = *position;
        for (axis, direction) in settings.vector.iter() {
            if !direction.is_driving() {
                continue;
            }
            let attempted = position[axis] + direction.factor() * settings.step[axis];
            match settings.limits.settle(axis, attempted, epsilon) {
                Some(value) => next[axis] = value,
                None => return Ok(TickOutcome::Halt(StopReason::BoundaryReached { axis, attempted })),
            }
        }

        let ticks = ticks_taken.saturating_add(1);
        if self.tick_ceiling > 0 && ticks >= self.tick_ceiling {
            Ok(TickOutcome::AdvanceAndFinish(next, StopReason::TickCeiling { ticks }))
        } else {
            Ok(TickOutcome::Advance(next))
        }
    }
}

/// 闭环逼近
///
/// 方向在创建时由 `sign(target - start)` 冻结。每个 tick：
/// 剩余距离大于一步的轴前进一步；一步之内的轴直接吸附到目标并退出后续计算。
/// 所有被驱动的轴都吸附后运动结束。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosedLoopPlan {
    target: AxisMap<f64>,
    direction: MotionVector,
    settled: AxisMap<bool>,
}

impl ClosedLoopPlan {
    /// 创建闭环规划
    pub fn new(start: &AxisMap<f64>, target: AxisMap<f64>, epsilon: f64) -> Self {
        let direction = target.map(|axis, value| Direction::from_delta(value - start[axis], epsilon));
        let settled = direction.map(|_, d| !d.is_driving());
        Self {
            target,
            direction,
            settled,
        }
    }

    /// 目标位置
    pub fn target(&self) -> &AxisMap<f64> {
        &self.target
    }

    /// 冻结的方向向量
    pub fn direction(&self) -> &MotionVector {
        &self.direction
    }

    /// 仍在运动的轴
    pub fn active_axes(&self) -> MotionVector {
        self.direction
            .map(|axis, d| if self.settled[axis] { Direction::Hold } else { d })
    }

    /// 是否所有轴都已到达
    pub fn is_complete(&self) -> bool {
        self.settled.iter().all(|(_, settled)| settled)
    }

    /// 计算下一步
    pub fn next(
        &mut self,
        position: &AxisMap<f64>,
        settings: &MotionSettings,
        epsilon: f64,
    ) -> Result<TickOutcome, DeviceError> {
        settings.limits.validate()?;
        settings.step.validate_for(&self.active_axes())?;

        if self.is_complete() {
            return Ok(TickOutcome::Halt(StopReason::TargetReached));
        }

        let mut next = *position;
        let mut settled = self.settled;
        for axis in Axis::ALL {
            if settled[axis] {
                continue;
            }
            let factor = self.direction[axis].factor();
            let step = settings.step[axis];
            let remaining = (self.target[axis] - position[axis]) * factor;

            let candidate = if remaining - step > epsilon {
                position[axis] + factor * step
            } else {
                settled[axis] = true;
                self.target[axis]
            };

            match settings.limits.settle(axis, candidate, epsilon) {
                Some(value) => next[axis] = value,
                None => {
                    return Ok(TickOutcome::Halt(StopReason::BoundaryReached {
                        axis,
                        attempted: candidate,
                    }));
                },
            }
        }

        self.settled = settled;
        if self.is_complete() {
            Ok(TickOutcome::AdvanceAndFinish(next, StopReason::TargetReached))
        } else {
            Ok(TickOutcome::Advance(next))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use antenna_types::MotionLimits;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn az_only(step: f64, min: f64, max: f64) -> MotionSettings {
        MotionSettings {
            step: AxisMap::splat(step),
            limits: MotionLimits::new(AxisMap::splat(min), AxisMap::splat(max)),
            vector: AxisMap::splat(Direction::Hold).with(Axis::Az, Direction::Forward),
            distance: 0.0,
        }
    }

    #[test]
    fn test_open_loop_rejects_tick_past_boundary() {
        let plan = OpenLoopPlan::new(50);
        let settings = az_only(1.0, -5.0, 5.0);
        let mut position = AxisMap::splat(0.0);
        let mut accepted = Vec::new();

        loop {
            match plan.next(&position, &settings, accepted.len() as u32, EPS).unwrap() {
                TickOutcome::Advance(next) => {
                    position = next;
                    accepted.push(next[Axis::Az]);
                },
                TickOutcome::Halt(reason) => {
                    assert_eq!(
                        reason,
                        StopReason::BoundaryReached {
                            axis: Axis::Az,
                            attempted: 6.0
                        }
                    );
                    break;
                },
                other => panic!("unexpected outcome {:?}", other),
            }
        }
        assert_eq!(accepted, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_open_loop_first_violating_axis_wins() {
        let plan = OpenLoopPlan::new(0);
        let mut settings = az_only(1.0, -1.0, 1.0);
        settings.vector = AxisMap::splat(Direction::Hold)
            .with(Axis::Pol, Direction::Forward)
            .with(Axis::El, Direction::Reverse);
        let position = AxisMap::splat(0.0).with(Axis::Pol, 1.0).with(Axis::El, -1.0);

        match plan.next(&position, &settings, 0, EPS).unwrap() {
            TickOutcome::Halt(StopReason::BoundaryReached { axis, .. }) => assert_eq!(axis, Axis::El),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_open_loop_tick_ceiling() {
        let plan = OpenLoopPlan::new(3);
        let settings = az_only(1.0, -100.0, 100.0);
        let position = AxisMap::splat(0.0);
        assert!(matches!(
            plan.next(&position, &settings, 1, EPS).unwrap(),
            TickOutcome::Advance(_)
        ));
        assert_eq!(
            plan.next(&position, &settings, 2, EPS).unwrap(),
            TickOutcome::AdvanceAndFinish(position.with(Axis::Az, 1.0), StopReason::TickCeiling { ticks: 3 })
        );
    }

    #[test]
    fn test_open_loop_snaps_accumulated_error_onto_bound() {
        let plan = OpenLoopPlan::new(0);
        let settings = az_only(0.1, -1.0, 0.3);
        let mut position = AxisMap::splat(0.0);
        for _ in 0..3 {
            match plan.next(&position, &settings, 0, EPS).unwrap() {
                TickOutcome::Advance(next) => position = next,
                other => panic!("unexpected outcome {:?}", other),
            }
        }
        // 0.1 + 0.1 + 0.1 = 0.30000000000000004，被吸附到上限
        assert_eq!(position[Axis::Az], 0.3);
    }

    #[test]
    fn test_open_loop_zero_step_on_driven_axis_is_error() {
        let plan = OpenLoopPlan::new(0);
        let mut settings = az_only(1.0, -5.0, 5.0);
        settings.step[Axis::Az] = 0.0;
        assert!(matches!(
            plan.next(&AxisMap::splat(0.0), &settings, 0, EPS),
            Err(DeviceError::InvalidStep { axis: Axis::Az, .. })
        ));
    }

    #[test]
    fn test_closed_loop_reaches_target_in_five_ticks() {
        let settings = MotionSettings {
            step: AxisMap::splat(2.0),
            ..MotionSettings::default()
        };
        let start = AxisMap::splat(0.0);
        let target = AxisMap::angular(10.0, 10.0, 0.0);
        let mut plan = ClosedLoopPlan::new(&start, target, EPS);
        assert_eq!(plan.direction()[Axis::Pol], Direction::Hold);

        let mut position = start;
        let mut ticks = 0;
        loop {
            ticks += 1;
            match plan.next(&position, &settings, EPS).unwrap() {
                TickOutcome::Advance(next) => position = next,
                TickOutcome::AdvanceAndFinish(next, reason) => {
                    position = next;
                    assert_eq!(reason, StopReason::TargetReached);
                    break;
                },
                TickOutcome::Halt(reason) => panic!("unexpected halt {:?}", reason),
            }
        }
        assert_eq!(ticks, 5);
        assert_eq!(position, target);
    }

    #[test]
    fn test_closed_loop_axes_settle_independently() {
        let settings = MotionSettings {
            step: AxisMap::splat(1.0),
            ..MotionSettings::default()
        };
        let start = AxisMap::splat(0.0);
        let mut plan = ClosedLoopPlan::new(&start, AxisMap::angular(3.0, -0.5, 0.0), EPS);

        // 第一个 tick：EL 在一步之内，直接吸附
        let position = match plan.next(&start, &settings, EPS).unwrap() {
            TickOutcome::Advance(next) => next,
            other => panic!("unexpected outcome {:?}", other),
        };
        assert_eq!(position[Axis::Az], 1.0);
        assert_eq!(position[Axis::El], -0.5);
        assert_eq!(plan.active_axes()[Axis::El], Direction::Hold);
        assert_eq!(plan.active_axes()[Axis::Az], Direction::Forward);
    }

    #[test]
    fn test_closed_loop_already_at_target() {
        let start = AxisMap::angular(1.0, 2.0, 3.0);
        let mut plan = ClosedLoopPlan::new(&start, start, EPS);
        assert!(plan.is_complete());
        assert_eq!(
            plan.next(&start, &MotionSettings::default(), EPS).unwrap(),
            TickOutcome::Halt(StopReason::TargetReached)
        );
    }

    #[test]
    fn test_closed_loop_respects_live_limits() {
        let mut settings = MotionSettings {
            step: AxisMap::splat(1.0),
            ..MotionSettings::default()
        };
        let start = AxisMap::splat(0.0);
        let mut plan = ClosedLoopPlan::new(&start, AxisMap::angular(10.0, 0.0, 0.0), EPS);

        // 运动中收紧上限
        settings.limits.max[Axis::Az] = 0.5;
        assert_eq!(
            plan.next(&start, &settings, EPS).unwrap(),
            TickOutcome::Halt(StopReason::BoundaryReached {
                axis: Axis::Az,
                attempted: 1.0
            })
        );
    }

    proptest! {
        #[test]
        fn prop_open_loop_never_leaves_limits(
            start in -50.0f64..50.0,
            step in 0.05f64..7.0,
            forward in any::<bool>(),
        ) {
            let plan = OpenLoopPlan::new(0);
            let mut settings = az_only(step, -50.0, 50.0);
            if !forward {
                settings.vector[Axis::Az] = Direction::Reverse;
            }
            let mut position = AxisMap::splat(0.0).with(Axis::Az, start);
            for ticks in 0..10_000u32 {
                match plan.next(&position, &settings, ticks, EPS).unwrap() {
                    TickOutcome::Advance(next) => {
                        prop_assert!(next[Axis::Az] >= -50.0 && next[Axis::Az] <= 50.0);
                        position = next;
                    },
                    TickOutcome::Halt(StopReason::BoundaryReached { attempted, .. }) => {
                        prop_assert!(!(-50.0 - EPS..=50.0 + EPS).contains(&attempted));
                        break;
                    },
                    other => prop_assert!(false, "unexpected outcome {:?}", other),
                }
            }
        }

        #[test]
        fn prop_closed_loop_lands_exactly_on_target(
            distance in 0.0f64..150.0,
            step in 0.5f64..5.0,
            reverse in any::<bool>(),
        ) {
            let settings = MotionSettings {
                step: AxisMap::splat(step),
                ..MotionSettings::default()
            };
            let target_az = if reverse { -distance } else { distance };
            let start = AxisMap::splat(0.0);
            let target = AxisMap::splat(0.0).with(Axis::Az, target_az);
            let mut plan = ClosedLoopPlan::new(&start, target, EPS);

            let mut position = start;
            let mut ticks = 0u32;
            loop {
                match plan.next(&position, &settings, EPS).unwrap() {
                    TickOutcome::Advance(next) => {
                        // 单调逼近
                        prop_assert!((target_az - next[Axis::Az]).abs() < (target_az - position[Axis::Az]).abs());
                        position = next;
                        ticks += 1;
                    },
                    TickOutcome::AdvanceAndFinish(next, _) => {
                        position = next;
                        ticks += 1;
                        break;
                    },
                    TickOutcome::Halt(reason) => {
                        prop_assert_eq!(reason, StopReason::TargetReached);
                        break;
                    },
                }
            }
            if ticks == 0 {
                // 起点已在容差内
                prop_assert!(distance <= EPS);
            } else {
                prop_assert_eq!(position[Axis::Az], target_az);
            }
            let expected = (distance / step).ceil() as u32;
            prop_assert!(ticks + 1 >= expected && ticks <= expected + 1, "ticks {} expected {}", ticks, expected);
        }
    }
}
