//! DomeController integration tests.
//!
//! Drive full runs through the public API with a recording sink and the
//! scripted plant, covering escalation, latching, reconfiguration and
//! post-run reporting.

use domectl::app::commands::AppCommand;
use domectl::app::events::AppEvent;
use domectl::config::{EnvironmentalSetpoints, PidGains, RunPlan, SystemConfig};
use domectl::fsm::ControlMode;
use domectl::fsm::context::{ActuatorCommand, SensorReadings};
use domectl::history::HistoryLog;
use domectl::safety::{AlertKind, AlertLevel};
use domectl::{DomeController, Error, power};

use crate::mock_hw::{Override, RecordingSink, ScriptedModel};

fn growing_config() -> SystemConfig {
    SystemConfig {
        initial_mode: ControlMode::Growing,
        ..SystemConfig::default()
    }
}

fn cold_dome() -> SensorReadings {
    SensorReadings {
        temperature_c: 15.0,
        humidity_percent: 40.0,
        co2_ppm: 400.0,
        ..SensorReadings::default()
    }
}

fn scripted(config: SystemConfig, model: ScriptedModel) -> DomeController<ScriptedModel> {
    DomeController::with_model(config, model)
        .unwrap()
        .with_sensors(cold_dome())
        .unwrap()
}

// ── End-to-end ────────────────────────────────────────────────

#[test]
fn day_long_growing_run_moves_toward_setpoints() {
    let mut dome = DomeController::new(growing_config())
        .unwrap()
        .with_sensors(cold_dome())
        .unwrap();
    let mut sink = RecordingSink::new();

    let metrics = dome.run(&RunPlan::new(24.0, 60.0).unwrap(), &mut sink).unwrap();

    assert_eq!(dome.history().len(), 1440);
    assert_eq!(metrics.steps, 1440);
    for (i, record) in dome.history().iter().enumerate() {
        assert_eq!(record.step, i as u64);
        assert_eq!(record.mode, ControlMode::Growing);
    }

    let final_t = dome.sense().temperature_c;
    assert!((final_t - 22.0).abs() < (15.0 - 22.0_f64).abs(), "final T = {final_t}");
    assert!(metrics.is_environment_stable(5.0));
    assert!((metrics.simulated_hours - 24.0).abs() < 1e-6);

    assert!(matches!(
        sink.last(),
        Some(AppEvent::RunCompleted { steps: 1440, .. })
    ));
    // Hourly telemetry.
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 24);
}

#[test]
fn cold_start_raises_temperature_alert_once() {
    let mut dome = scripted(growing_config(), ScriptedModel::new());
    let mut sink = RecordingSink::new();
    for _ in 0..5 {
        dome.step(60.0, &mut sink).unwrap();
    }
    let raised = sink.count(|e| {
        matches!(e, AppEvent::AlertRaised(a)
            if a.kind == AlertKind::Temperature && a.level == AlertLevel::Critical)
    });
    assert_eq!(raised, 1);
}

// ── Emergency ─────────────────────────────────────────────────

#[test]
fn hypoxia_forces_safe_state_regardless_of_tuning() {
    let tunings = [
        PidGains::new(2.0, 0.1, 0.5, -100.0, 100.0),
        PidGains::new(50.0, 5.0, 10.0, -100.0, 100.0),
        PidGains::new(0.0, 0.0, 0.0, 0.0, 0.0),
    ];

    for gains in tunings {
        let mut config = growing_config();
        config.control.temperature = gains;
        config.control.humidity = gains;
        config.setpoints.temperature_c = 35.0;

        let model = ScriptedModel::new().after_step(4, Override::O2(15.0));
        let mut dome = scripted(config, model);
        let mut sink = RecordingSink::new();

        for _ in 0..5 {
            let cmd = dome.step(60.0, &mut sink).unwrap();
            assert_ne!(cmd, ActuatorCommand::safe_state());
        }
        let cmd = dome.step(60.0, &mut sink).unwrap();
        assert_eq!(cmd, ActuatorCommand::safe_state(), "gains {gains:?}");
        assert_eq!(dome.mode(), ControlMode::Emergency);

        let record = dome.history().last().unwrap();
        assert_eq!(record.step, 5);
        assert_eq!(record.mode, ControlMode::Emergency);
        assert_eq!(record.energy_draw_w, 40.0);
        assert_eq!(
            sink.mode_changes(),
            vec![(ControlMode::Growing, ControlMode::Emergency)]
        );
    }
}

#[test]
fn control_resumes_under_latched_emergency_once_hypoxia_clears() {
    let model = ScriptedModel::new()
        .after_step(0, Override::O2(12.0))
        .after_step(2, Override::O2(20.9));
    let mut dome = scripted(growing_config(), model);
    let mut sink = RecordingSink::new();

    let first = dome.step(60.0, &mut sink).unwrap();
    assert_ne!(first, ActuatorCommand::safe_state());
    for _ in 0..2 {
        let cmd = dome.step(60.0, &mut sink).unwrap();
        assert_eq!(cmd, ActuatorCommand::safe_state());
        assert_eq!(dome.mode(), ControlMode::Emergency);
    }

    // O2 is back to normal: the label stays latched, the loops run again.
    let resumed_at = dome.sense().temperature_c;
    for _ in 0..10 {
        let cmd = dome.step(60.0, &mut sink).unwrap();
        assert_eq!(dome.mode(), ControlMode::Emergency);
        assert!(!dome.state().has_emergency_alert());
        assert_ne!(cmd, ActuatorCommand::safe_state());
        assert!(cmd.heater_power_percent > 0.0);
    }
    assert!(dome.state().alerts.iter().all(|a| a.kind != AlertKind::Oxygen));
    let record = dome.history().last().unwrap();
    assert_eq!(record.mode, ControlMode::Emergency);
    assert!(record.energy_draw_w > 40.0);

    for _ in 0..200 {
        dome.step(60.0, &mut sink).unwrap();
    }
    assert_eq!(dome.mode(), ControlMode::Emergency);
    assert!(dome.sense().temperature_c > resumed_at);

    dome.handle_command(AppCommand::SetMode(ControlMode::Growing), &mut sink)
        .unwrap();
    let cmd = dome.step(60.0, &mut sink).unwrap();
    assert_eq!(dome.mode(), ControlMode::Growing);
    assert_ne!(cmd, ActuatorCommand::safe_state());
    assert_eq!(
        sink.mode_changes(),
        vec![
            (ControlMode::Growing, ControlMode::Emergency),
            (ControlMode::Emergency, ControlMode::Growing),
        ]
    );
}

#[test]
fn safe_state_follows_each_step_alerts_while_latched() {
    let model = ScriptedModel::new()
        .after_step(0, Override::O2(15.0))
        .after_step(1, Override::O2(20.9))
        .after_step(3, Override::O2(16.0));
    let mut dome = scripted(growing_config(), model);
    let mut sink = RecordingSink::new();

    let safe: Vec<bool> = (0..5)
        .map(|_| dome.step(60.0, &mut sink).unwrap() == ActuatorCommand::safe_state())
        .collect();
    assert_eq!(safe, vec![false, true, false, false, true]);
    assert_eq!(dome.mode(), ControlMode::Emergency);
    assert_eq!(
        sink.mode_changes(),
        vec![(ControlMode::Growing, ControlMode::Emergency)]
    );
}

#[test]
fn emergency_steps_are_counted_in_metrics() {
    let model = ScriptedModel::new().after_step(9, Override::O2(10.0));
    let mut dome = DomeController::with_model(growing_config(), model).unwrap();
    let metrics = dome
        .run(&RunPlan::new(1.0, 60.0).unwrap(), &mut RecordingSink::new())
        .unwrap();
    // Steps 10..60 run in Emergency; O2 never recovers with the lights off.
    assert_eq!(metrics.emergency_steps, 50);
    assert_eq!(metrics.peak_alert, AlertLevel::Emergency);
    assert_eq!(metrics.final_mode, ControlMode::Emergency);
    assert!(!metrics.is_environment_stable(100.0));
}

// ── Reconfiguration ───────────────────────────────────────────

#[test]
fn setpoint_updates_are_validated_and_applied_between_steps() {
    let mut dome = scripted(growing_config(), ScriptedModel::new());
    let mut sink = RecordingSink::new();
    dome.step(60.0, &mut sink).unwrap();

    let bad = EnvironmentalSetpoints {
        temperature_tolerance: 0.0,
        ..EnvironmentalSetpoints::default()
    };
    assert!(matches!(
        dome.handle_command(AppCommand::UpdateSetpoints(bad), &mut sink),
        Err(Error::Config(_))
    ));

    let warmer = EnvironmentalSetpoints {
        temperature_c: 26.0,
        ..EnvironmentalSetpoints::default()
    };
    dome.handle_command(AppCommand::UpdateSetpoints(warmer), &mut sink)
        .unwrap();
    dome.step(60.0, &mut sink).unwrap();

    assert_eq!(dome.history().get(0).unwrap().setpoints.temperature_c, 22.0);
    assert_eq!(dome.history().get(1).unwrap().setpoints.temperature_c, 26.0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SetpointsUpdated(_))), 1);
}

#[test]
fn shortened_photoperiod_turns_lights_off_earlier() {
    let mut dome = DomeController::new(growing_config()).unwrap();
    let mut sink = RecordingSink::new();
    let short_day = EnvironmentalSetpoints {
        photoperiod_hours: 4.0,
        ..EnvironmentalSetpoints::default()
    };
    dome.handle_command(AppCommand::UpdateSetpoints(short_day), &mut sink)
        .unwrap();
    dome.run(&RunPlan::new(6.0, 60.0).unwrap(), &mut sink).unwrap();
    // 05:00 is past the 4 h photoperiod.
    assert_eq!(dome.history().get(300).unwrap().commands.led_power_percent, 0.0);
}

#[test]
fn identical_controllers_produce_identical_histories() {
    let run = || {
        let mut dome = scripted(growing_config(), ScriptedModel::new());
        dome.run(&RunPlan::new(2.0, 30.0).unwrap(), &mut RecordingSink::new())
            .unwrap();
        dome.history().to_bytes().unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn reset_controllers_clears_loop_memory() {
    let mut dome = scripted(growing_config(), ScriptedModel::new());
    let mut sink = RecordingSink::new();
    for _ in 0..30 {
        dome.step(60.0, &mut sink).unwrap();
    }
    dome.handle_command(AppCommand::ResetControllers, &mut sink)
        .unwrap();
    assert!(matches!(sink.last(), Some(AppEvent::ControllersReset)));

    // A fresh controller seeded with the same readings issues the same
    // next command as the reset one.
    let mut fresh = DomeController::with_model(growing_config(), ScriptedModel::new())
        .unwrap()
        .with_sensors(dome.sense())
        .unwrap();
    let a = dome.step(60.0, &mut sink).unwrap();
    let b = fresh.step(60.0, &mut RecordingSink::new()).unwrap();
    assert_eq!(a, b);
}

// ── Reporting ─────────────────────────────────────────────────

#[test]
fn total_energy_integrates_recorded_draw() {
    let mut dome = scripted(growing_config(), ScriptedModel::new());
    let metrics = dome
        .run(&RunPlan::new(3.0, 60.0).unwrap(), &mut RecordingSink::new())
        .unwrap();
    let history = dome.history().as_slice();

    let kwh = power::total_energy_kwh(history);
    assert_eq!(kwh, metrics.total_energy_kwh);
    assert!(kwh > 0.0);

    for record in history {
        assert_eq!(record.energy_draw_w, power::instantaneous_draw_w(&record.commands));
    }
}

#[test]
fn history_snapshot_restores_completed_run() {
    let mut dome = scripted(growing_config(), ScriptedModel::new());
    dome.run(&RunPlan::new(1.0, 60.0).unwrap(), &mut RecordingSink::new())
        .unwrap();
    let (state, history) = dome.into_parts();

    let restored = HistoryLog::from_bytes(&history.to_bytes().unwrap()).unwrap();
    assert_eq!(restored, history);
    assert_eq!(restored.last().unwrap().sensors, state.sensors);
}

#[test]
fn model_sees_every_command_in_order() {
    let mut dome = scripted(growing_config(), ScriptedModel::new());
    let mut sink = RecordingSink::new();
    let issued: Vec<_> = (0..20).map(|_| dome.step(60.0, &mut sink).unwrap()).collect();
    let recorded: Vec<_> = dome.history().iter().map(|r| r.commands).collect();
    assert_eq!(issued, recorded);
}

#[test]
fn invalid_plan_is_rejected_before_any_step() {
    let mut dome = DomeController::new(growing_config()).unwrap();
    let mut sink = RecordingSink::new();
    let plan = RunPlan {
        duration_hours: 0.0,
        step_secs: 60.0,
    };
    assert!(matches!(dome.run(&plan, &mut sink), Err(Error::InvalidRun(_))));
    assert!(dome.history().is_empty());
    assert!(sink.events.is_empty());
}

#[test]
fn partial_final_step_is_rounded_up() {
    let mut dome = DomeController::new(growing_config()).unwrap();
    let metrics = dome
        .run(&RunPlan::new(1.0, 7.0).unwrap(), &mut RecordingSink::new())
        .unwrap();
    // ceil(3600 / 7)
    assert_eq!(metrics.steps, 515);
}

// ── Independent runs ──────────────────────────────────────────

#[test]
fn independent_runs_on_threads_match_sequential_runs() {
    let start_temps = [5.0, 15.0, 25.0];
    let simulate = |t: f64| {
        let sensors = SensorReadings {
            temperature_c: t,
            ..SensorReadings::default()
        };
        let mut dome = DomeController::new(growing_config())
            .unwrap()
            .with_sensors(sensors)
            .unwrap();
        dome.run(&RunPlan::new(4.0, 60.0).unwrap(), &mut RecordingSink::new())
            .unwrap();
        dome.sense()
    };

    let handles: Vec<_> = start_temps
        .iter()
        .map(|&t| std::thread::spawn(move || simulate(t)))
        .collect();
    let parallel: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let sequential: Vec<_> = start_temps.iter().map(|&t| simulate(t)).collect();

    assert_eq!(parallel, sequential);
}
