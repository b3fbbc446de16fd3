//! 配置文件驱动的设备创建

use antenna_sdk::prelude::*;
use antenna_sdk::types::SweepSettings;
use antenna_sdk::RangeConfig;

const CONFIG: &str = r#"
[motion]
tick_interval_ms = 5
tick_ceiling = 3
scheduler = "cooperative"

[simulation]
scan_latency_ms = 0
connect_latency_ms = 0
output_latency_ms = 0
seed = 11

[positioner]
distance = 2.5

[positioner.step]
az = 0.5
el = 1.0
pol = 1.0
x = 0.1
y = 0.1
v = 0.1

[analyzer]
start_hz = 2.40e9
stop_hz = 2.50e9
rbw_hz = 100e3
"#;

#[test]
fn profile_from_config_applies_to_every_device() {
    let config = RangeConfig::from_toml_str(CONFIG).unwrap();
    let registry = DeviceRegistry::with_simulators(config.simulator_profile());

    let analyzer = registry.create(SIMULATED_ANALYZER).unwrap();
    let sa = analyzer.analyzer().unwrap();
    assert_eq!(
        sa.sweep_settings(),
        SweepSettings {
            start_hz: 2.40e9,
            stop_hz: 2.50e9,
            rbw_hz: 100e3,
        }
    );
    analyzer.connect().unwrap();
    let peak = sa.find_peak();
    assert!(peak.frequency_hz >= 2.44e9 && peak.frequency_hz <= 2.46e9);

    let positioner = registry.create(SIMULATED_POSITIONER).unwrap();
    let pos = positioner.positioner().unwrap();
    assert_eq!(pos.motion_settings().distance, 2.5);

    // tick 上限 3，AZ 步长 0.5
    positioner.connect().unwrap();
    pos.set_movement(AxisMap::splat(Direction::Hold).with(Axis::Az, Direction::Forward));
    let (recorder, rx) = EventRecorder::new();
    recorder.attach(positioner.events());
    pos.start_motion().unwrap();
    while pos.tick() {}

    assert_eq!(pos.position().az(), 1.5);
    let summary = rx
        .try_iter()
        .find_map(|e| match e {
            DeviceEvent::MotionStopped(summary) => Some(summary),
            _ => None,
        })
        .unwrap();
    assert_eq!(summary.reason, StopReason::TickCeiling { ticks: 3 });
}

#[test]
fn invalid_config_is_rejected() {
    let err = RangeConfig::from_toml_str("[motion]\ntick_interval_ms = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}
