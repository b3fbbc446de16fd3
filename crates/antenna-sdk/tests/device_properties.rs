//! 设备行为测试
//!
//! 通过工厂注册表创建模拟设备，用 EventRecorder 观察完整的事件序列：
//! 1. 未连接时调用仅连接可用的操作：恰好一个 error，状态不变
//! 2. 运动中断开：motion-stopped 在 disconnected 之前，之后不再有 position-changed
//! 3. 开环运动在边界处停止，越界位置从不上报
//! 4. 闭环运动恰好落在目标上
//! 5. 运动中重定向：两次运动的事件不交错
//! 6. 重复打开射频输出只触发一次 output-enabled
//! 7. 未连接时搜索峰值返回哨兵值

use antenna_sdk::prelude::*;
use antenna_sdk::types::StepSize;
use antenna_sdk::{MotionConfig, SchedulerKind};
use antenna_sdk::devices::SimulatedLatency;
use crossbeam_channel::Receiver;
use std::time::Duration;

fn registry(scheduler: SchedulerKind, interval_ms: u64) -> DeviceRegistry {
    DeviceRegistry::with_simulators(SimulatorProfile {
        latency: SimulatedLatency::instant(),
        seed: Some(7),
        motion: MotionConfig {
            tick_interval: Duration::from_millis(interval_ms),
            tick_ceiling: 0,
            scheduler,
            ..MotionConfig::default()
        },
        ..SimulatorProfile::default()
    })
}

fn create(registry: &DeviceRegistry, plugin: &str) -> (DeviceHandle, Receiver<DeviceEvent>) {
    let handle = registry.create(plugin).unwrap();
    let (recorder, rx) = EventRecorder::new();
    recorder.attach(handle.events());
    (handle, rx)
}

fn kinds(rx: &Receiver<DeviceEvent>) -> Vec<&'static str> {
    rx.try_iter().map(|e| e.kind()).collect()
}

fn stop_summaries(events: &[DeviceEvent]) -> Vec<MotionSummary> {
    events
        .iter()
        .filter_map(|e| match e {
            DeviceEvent::MotionStopped(summary) => Some(*summary),
            _ => None,
        })
        .collect()
}

fn drain_positions(events: &[DeviceEvent]) -> Vec<PositionState> {
    events
        .iter()
        .filter_map(|e| match e {
            DeviceEvent::PositionChanged(pos) => Some(*pos),
            _ => None,
        })
        .collect()
}

fn az_range(min: f64, max: f64) -> (AxisMap<f64>, AxisMap<f64>) {
    (
        AxisMap::new([min, -90.0, -180.0, -100.0, -100.0, -100.0]),
        AxisMap::new([max, 90.0, 180.0, 100.0, 100.0, 100.0]),
    )
}

#[test]
fn connected_only_operations_fail_once_each_without_mutation() {
    let registry = registry(SchedulerKind::Cooperative, 10);

    let (analyzer, rx) = create(&registry, SIMULATED_ANALYZER);
    let peak = analyzer.analyzer().unwrap().find_peak();
    assert!(!peak.is_measured());
    assert_eq!(kinds(&rx), vec!["error"]);

    let (generator, rx) = create(&registry, SIMULATED_GENERATOR);
    let sg = generator.generator().unwrap();
    assert!(sg.enable_output().is_err());
    assert_eq!(kinds(&rx), vec!["error"]);
    assert!(!sg.is_output_enabled());
    assert!(sg.disable_output().is_err());
    assert_eq!(kinds(&rx), vec!["error"]);

    let (positioner, rx) = create(&registry, SIMULATED_POSITIONER);
    let pos = positioner.positioner().unwrap();
    pos.set_movement(AxisMap::splat(Direction::Hold).with(Axis::Az, Direction::Forward));
    let before = pos.position();

    let err = pos.start_motion().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotConnected);
    assert_eq!(kinds(&rx), vec!["error"]);

    assert!(pos.move_to(10.0, 10.0, None).is_err());
    assert_eq!(kinds(&rx), vec!["error"]);

    assert!(!pos.is_moving());
    assert!(!pos.tick());
    assert_eq!(pos.position(), before);
}

#[test]
fn disconnect_while_moving_stops_first() {
    let registry = registry(SchedulerKind::Thread, 2);
    let (handle, rx) = create(&registry, SIMULATED_POSITIONER);
    let pos = handle.positioner().unwrap();

    handle.connect().unwrap();
    pos.set_movement(AxisMap::splat(Direction::Hold).with(Axis::El, Direction::Forward));
    pos.start_motion().unwrap();
    std::thread::sleep(Duration::from_millis(20));
    handle.disconnect().unwrap();

    assert!(!pos.is_moving());
    assert!(!handle.is_connected());

    let events: Vec<_> = rx.try_iter().collect();
    let stopped_at = events.iter().position(|e| e.kind() == "motion-stopped").unwrap();
    let disconnected_at = events.iter().position(|e| e.kind() == "disconnected").unwrap();
    assert!(stopped_at < disconnected_at);
    assert_eq!(events.iter().filter(|e| e.kind() == "motion-stopped").count(), 1);
    assert_eq!(events.iter().filter(|e| e.kind() == "disconnected").count(), 1);
    assert!(!events[stopped_at..].iter().any(|e| e.kind() == "position-changed"));

    let summary = stop_summaries(&events)[0];
    assert_eq!(summary.reason, StopReason::Cancelled);
    assert_eq!(summary.final_position, pos.position());

    // 断开后不再有事件
    std::thread::sleep(Duration::from_millis(10));
    assert!(rx.try_recv().is_err());
}

#[test]
fn open_loop_stops_at_boundary() {
    let registry = registry(SchedulerKind::Cooperative, 10);
    let (handle, rx) = create(&registry, SIMULATED_POSITIONER);
    let pos = handle.positioner().unwrap();

    handle.connect().unwrap();
    let (min, max) = az_range(-5.0, 5.0);
    pos.set_axis_step(Axis::Az, 1.0);
    pos.set_min_range(min);
    pos.set_max_range(max);
    pos.set_movement(AxisMap::splat(Direction::Hold).with(Axis::Az, Direction::Forward));

    pos.start_motion().unwrap();
    while pos.tick() {}

    let events: Vec<_> = rx.try_iter().collect();
    let azimuths: Vec<f64> = drain_positions(&events).iter().map(|p| p.az()).collect();
    assert_eq!(azimuths, vec![1.0, 2.0, 3.0, 4.0, 5.0]);

    let summaries = stop_summaries(&events);
    assert_eq!(summaries.len(), 1);
    assert!(matches!(
        summaries[0].reason,
        StopReason::BoundaryReached { axis: Axis::Az, .. }
    ));
    assert_eq!(summaries[0].steps_taken, 5);
    assert_eq!(pos.position().az(), 5.0);
    assert!(!pos.is_moving());
}

#[test]
fn closed_loop_lands_on_target() {
    let registry = registry(SchedulerKind::Cooperative, 10);
    let (handle, rx) = create(&registry, SIMULATED_POSITIONER);
    let pos = handle.positioner().unwrap();

    handle.connect().unwrap();
    pos.set_step(StepSize::factory().with(Axis::Az, 2.0).with(Axis::El, 2.0));
    pos.move_to(10.0, 10.0, None).unwrap();
    assert!(pos.is_moving());
    while pos.tick() {}

    let events: Vec<_> = rx.try_iter().collect();
    let positions = drain_positions(&events);
    assert_eq!(positions.len(), 5);
    assert_eq!(positions[4].az(), 10.0);
    assert_eq!(positions[4].el(), 10.0);
    assert_eq!(positions[4].pol(), 0.0);

    let summaries = stop_summaries(&events);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].mode, MotionMode::ClosedLoop);
    assert_eq!(summaries[0].reason, StopReason::TargetReached);
    assert!(!pos.is_moving());
}

#[test]
fn retarget_never_interleaves_runs() {
    let registry = registry(SchedulerKind::Thread, 2);
    let (handle, rx) = create(&registry, SIMULATED_POSITIONER);
    let pos = handle.positioner().unwrap();

    handle.connect().unwrap();
    pos.set_step(StepSize::factory().with(Axis::Az, 0.5));
    pos.move_to(45.0, 0.0, None).unwrap();
    std::thread::sleep(Duration::from_millis(15));
    pos.move_to(-3.0, 0.0, None).unwrap();

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while pos.is_moving() && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(!pos.is_moving());

    // started / stopped 严格交替，位置事件只出现在两者之间
    let events: Vec<_> = rx.try_iter().collect();
    let mut in_run = false;
    let mut runs = 0;
    for event in &events {
        match event {
            DeviceEvent::MotionStarted(_) => {
                assert!(!in_run);
                in_run = true;
                runs += 1;
            },
            DeviceEvent::MotionStopped(_) => {
                assert!(in_run);
                in_run = false;
            },
            DeviceEvent::PositionChanged(_) => assert!(in_run),
            _ => {},
        }
    }
    assert_eq!(runs, 2);

    let summaries = stop_summaries(&events);
    assert_eq!(summaries[0].reason, StopReason::Superseded);
    assert_eq!(summaries[1].reason, StopReason::TargetReached);
    assert_eq!(pos.position().az(), -3.0);
}

#[test]
fn enable_output_twice_fires_once() {
    let registry = registry(SchedulerKind::Cooperative, 10);
    let (handle, rx) = create(&registry, SIMULATED_GENERATOR);
    handle.connect().unwrap();

    let sg = handle.generator().unwrap();
    sg.enable_output().unwrap();
    sg.enable_output().unwrap();
    assert!(sg.is_output_enabled());
    assert_eq!(kinds(&rx), vec!["connected", "output-enabled"]);
}

#[test]
fn find_peak_while_disconnected_returns_sentinel() {
    let registry = registry(SchedulerKind::Cooperative, 10);
    let (handle, rx) = create(&registry, SIMULATED_ANALYZER);

    let peak = handle.analyzer().unwrap().find_peak();
    assert_eq!(peak.level_dbm, SpectralPeak::NO_MEASUREMENT_LEVEL_DBM);

    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], DeviceEvent::Error(DeviceError::NotConnected { .. })));
    assert!(!events.iter().any(|e| e.kind() == "peak-found"));
}
