//! Fuzz target: one control step from arbitrary readings
//!
//! Decodes sensor readings, a mode and a step size from raw bytes, runs a
//! few control steps and verifies:
//! - No panics under arbitrary inputs
//! - Readings stay finite and inside their physical domains
//! - Hypoxic readings always yield the safe-state command
//!
//! cargo fuzz run fuzz_control_step

#![no_main]

use domectl::DomeController;
use domectl::app::events::AppEvent;
use domectl::app::ports::EventSink;
use domectl::config::SystemConfig;
use domectl::fsm::ControlMode;
use domectl::fsm::context::{ActuatorCommand, SensorReadings};
use domectl::plant::ABSOLUTE_ZERO_C;
use domectl::safety::O2_HYPOXIA_PERCENT;
use libfuzzer_sys::fuzz_target;

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

fn f64_at(data: &[u8], idx: usize) -> f64 {
    let mut buf = [0u8; 8];
    for (i, b) in buf.iter_mut().enumerate() {
        *b = data.get(idx * 8 + i).copied().unwrap_or(0);
    }
    f64::from_le_bytes(buf)
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 49 {
        return;
    }

    let sensors = SensorReadings {
        temperature_c: f64_at(data, 0),
        humidity_percent: f64_at(data, 1),
        co2_ppm: f64_at(data, 2),
        o2_percent: f64_at(data, 3),
        elapsed_secs: f64_at(data, 4),
        ..SensorReadings::default()
    };
    let dt = f64_at(data, 5);
    let mode = ControlMode::from_index(usize::from(data[48] % 4));

    let config = SystemConfig {
        initial_mode: mode,
        ..SystemConfig::default()
    };
    let Ok(dome) = DomeController::new(config) else {
        return;
    };
    // Non-finite and physically impossible seeds are rejected up front.
    let Ok(mut dome) = dome.with_sensors(sensors) else {
        assert!(!sensors.is_finite() || !sensors.is_in_domain());
        return;
    };
    // Keep magnitudes where the physics stays representable.
    let in_range = [
        sensors.temperature_c,
        sensors.humidity_percent,
        sensors.co2_ppm,
        sensors.o2_percent,
        sensors.elapsed_secs,
    ]
    .iter()
    .all(|v| v.abs() < 1.0e9);
    if !in_range {
        return;
    }

    let mut sink = NullSink;
    match dome.step(dt, &mut sink) {
        Err(_) => assert!(!(dt.is_finite() && dt > 0.0)),
        Ok(cmd) => {
            if sensors.o2_percent < O2_HYPOXIA_PERCENT {
                assert_eq!(cmd, ActuatorCommand::safe_state());
            }
            if dt > 1.0e6 {
                return;
            }
            let s = dome.sense();
            assert!(s.is_finite());
            assert!(s.temperature_c >= ABSOLUTE_ZERO_C);
            assert!((0.0..=100.0).contains(&s.humidity_percent));
            assert!(s.co2_ppm >= 0.0);
            assert!((0.0..=100.0).contains(&s.o2_percent));
        }
    }
});
