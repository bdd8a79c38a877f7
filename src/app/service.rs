//! Control loop driver: the hexagonal core.
//!
//! [`DomeController`] owns the FSM, the alert evaluator, the three PID
//! loops, the lighting scheduler, the plant model, and the single mutable
//! [`DomeState`].  All outbound traffic goes through the
//! [`EventSink`] port passed in at call sites, so the whole loop runs
//! unchanged against the reference physics or a scripted test double.
//!
//! ```text
//!                 ┌───────────────────────────────────┐
//!  AppCommand ──▶ │          DomeController           │ ──▶ EventSink
//!                 │  alerts · FSM · PID ×3 · lighting │
//!                 │  energy · model · history         │
//!                 └───────────────────────────────────┘
//! ```
//!
//! One step, in order:
//!
//! 1. evaluate alerts against the current readings
//! 2. tick the FSM (escalates to Emergency on an Emergency alert)
//! 3. Emergency alert present: safe state; otherwise three PID updates,
//!    lighting and fan (also while the Emergency mode stays latched)
//! 4. compute the instantaneous power draw
//! 5. advance the environment model
//! 6. append a history record
//! 7. emit telemetry when the interval has elapsed

use log::{debug, info};

use crate::config::{ControlConfig, RunPlan, SystemConfig};
use crate::control::mapper;
use crate::control::pid::PidController;
use crate::diagnostics::RunMetrics;
use crate::error::{Error, Result};
use crate::fsm::context::{ActuatorCommand, DomeState, SensorReadings};
use crate::fsm::states::build_state_table;
use crate::fsm::{ControlMode, Fsm};
use crate::history::{HistoryLog, HistoryRecord};
use crate::plant::LunarDomePlant;
use crate::power;
use crate::safety::{self, AlertEvaluator};
use crate::scheduler::PhotoperiodScheduler;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{EnvironmentModel, EventSink};

// ───────────────────────────────────────────────────────────────
// Feedback loops
// ───────────────────────────────────────────────────────────────

/// The three independent PID loops.
#[derive(Debug, Clone)]
struct FeedbackLoops {
    temperature: PidController,
    humidity: PidController,
    co2: PidController,
}

impl FeedbackLoops {
    fn from_config(control: &ControlConfig) -> Result<Self> {
        Ok(Self {
            temperature: PidController::from_gains(&control.temperature)?,
            humidity: PidController::from_gains(&control.humidity)?,
            co2: PidController::from_gains(&control.co2)?,
        })
    }

    fn reset(&mut self) {
        self.temperature.reset();
        self.humidity.reset();
        self.co2.reset();
    }
}

// ───────────────────────────────────────────────────────────────
// DomeController
// ───────────────────────────────────────────────────────────────

/// Drives one dome through a run, one step at a time.
///
/// Each controller is fully isolated: independent runs get independent
/// controllers and may execute on separate threads.
pub struct DomeController<M: EnvironmentModel = LunarDomePlant> {
    dome_id: String,
    fsm: Fsm,
    state: DomeState,
    alerts: AlertEvaluator,
    loops: FeedbackLoops,
    lighting: PhotoperiodScheduler,
    model: M,
    history: HistoryLog,
    telemetry_interval_secs: f64,
    next_telemetry_secs: f64,
    started: bool,
}

impl DomeController<LunarDomePlant> {
    /// Build a controller driving the reference lunar plant.
    pub fn new(config: SystemConfig) -> Result<Self> {
        Self::with_model(config, LunarDomePlant::new())
    }
}

impl<M: EnvironmentModel> DomeController<M> {
    /// Build a controller around any environment model.
    ///
    /// Validates the whole configuration up front; nothing later in the
    /// run can fail because of it.
    pub fn with_model(config: SystemConfig, model: M) -> Result<Self> {
        config.validate()?;
        let loops = FeedbackLoops::from_config(&config.control)?;
        let sensors = SensorReadings::default();

        Ok(Self {
            fsm: Fsm::new(build_state_table(), config.initial_mode),
            state: DomeState::new(config.initial_mode, sensors, config.setpoints),
            alerts: AlertEvaluator::new(),
            loops,
            lighting: PhotoperiodScheduler::new(config.setpoints.photoperiod_hours),
            model,
            history: HistoryLog::new(),
            telemetry_interval_secs: config.telemetry_interval_secs,
            next_telemetry_secs: sensors.elapsed_secs + config.telemetry_interval_secs,
            dome_id: config.dome_id,
            started: false,
        })
    }

    /// Replace the initial sensor readings.  Must be called before the
    /// first step.
    pub fn with_sensors(mut self, sensors: SensorReadings) -> Result<Self> {
        if !sensors.is_finite() {
            return Err(Error::Config("initial sensor readings must be finite"));
        }
        if !sensors.is_in_domain() {
            return Err(Error::Config("initial sensor readings outside physical range"));
        }
        if !self.history.is_empty() {
            return Err(Error::InvalidRun("sensors can only be seeded before the first step"));
        }
        self.state.sensors = sensors;
        self.next_telemetry_secs = sensors.elapsed_secs + self.telemetry_interval_secs;
        Ok(self)
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter the initial mode.  Called automatically by the first step if
    /// the caller has not done so.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        if self.started {
            return;
        }
        self.started = true;
        self.fsm.start(&mut self.state);
        sink.emit(&AppEvent::Started {
            dome_id: self.dome_id.clone(),
            mode: self.fsm.current_mode(),
        });
        info!("DomeController {} started in {}", self.dome_id, self.fsm.current_mode());
    }

    // ── Per-step orchestration ────────────────────────────────

    /// Current sensor readings, as the control logic sees them.
    pub fn sense(&self) -> SensorReadings {
        self.state.sensors
    }

    /// Run one control step of `dt_secs` seconds and return the actuator
    /// command that was in force during it.
    pub fn step(&mut self, dt_secs: f64, sink: &mut impl EventSink) -> Result<ActuatorCommand> {
        if !(dt_secs.is_finite() && dt_secs > 0.0) {
            return Err(Error::InvalidRun("step size must be positive and finite"));
        }
        self.start(sink);
        Ok(self.advance(dt_secs, sink))
    }

    /// Execute a whole run: exactly `plan.step_count()` steps in sequence.
    ///
    /// The plan is validated before the first step; once accepted the run
    /// cannot fail.
    pub fn run(&mut self, plan: &RunPlan, sink: &mut impl EventSink) -> Result<RunMetrics> {
        let steps = plan.step_count()?;
        info!(
            "Run {}: {:.1}h at dt={:.0}s ({} steps) in {}",
            self.dome_id,
            plan.duration_hours,
            plan.step_secs,
            steps,
            self.fsm.current_mode()
        );

        self.start(sink);
        if let Ok(n) = usize::try_from(steps) {
            self.history.reserve(n);
        }
        for _ in 0..steps {
            self.advance(plan.step_secs, sink);
        }

        let metrics = self.metrics();
        sink.emit(&AppEvent::RunCompleted {
            steps,
            total_energy_kwh: metrics.total_energy_kwh,
        });
        info!(
            "Run {} complete: T={:.1}°C H={:.1}% CO2={:.0}ppm, {:.2} kWh",
            self.dome_id,
            self.state.sensors.temperature_c,
            self.state.sensors.humidity_percent,
            self.state.sensors.co2_ppm,
            metrics.total_energy_kwh
        );
        Ok(metrics)
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply an external command between steps.
    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) -> Result<()> {
        match cmd {
            AppCommand::SetMode(target) => {
                self.start(sink);
                let prev = self.fsm.current_mode();
                if target != prev {
                    info!(
                        "Operator mode change {:?} -> {:?} after {} step(s)",
                        prev,
                        target,
                        self.fsm.ticks_in_current_state()
                    );
                }
                self.fsm.force_transition(target, &mut self.state);
                if target != prev {
                    sink.emit(&AppEvent::ModeChanged { from: prev, to: target });
                }
            }
            AppCommand::UpdateSetpoints(setpoints) => {
                setpoints.validate()?;
                self.state.setpoints = setpoints;
                self.lighting.set_photoperiod(setpoints.photoperiod_hours);
                sink.emit(&AppEvent::SetpointsUpdated(setpoints));
                info!("Setpoints updated at runtime");
            }
            AppCommand::ResetControllers => {
                self.loops.reset();
                sink.emit(&AppEvent::ControllersReset);
                info!("Feedback loops reset");
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn dome_id(&self) -> &str {
        &self.dome_id
    }

    pub fn mode(&self) -> ControlMode {
        self.fsm.current_mode()
    }

    /// The live dome state (final state once a run has completed).
    pub fn state(&self) -> &DomeState {
        &self.state
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Consume the controller, keeping the final state and the history.
    pub fn into_parts(self) -> (DomeState, HistoryLog) {
        (self.state, self.history)
    }

    /// Metrics over everything executed so far.
    pub fn metrics(&self) -> RunMetrics {
        RunMetrics::collect(&self.dome_id, &self.state, self.history.as_slice())
    }

    /// Build a telemetry snapshot from the current state.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            step: self.history.len().saturating_sub(1) as u64,
            mode: self.state.mode,
            sensors: self.state.sensors,
            commands: self.state.commands,
            energy_draw_w: self.state.energy_draw_w,
            max_alert: safety::max_level(&self.state.alerts),
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// One step with an already validated `dt_secs`.
    fn advance(&mut self, dt_secs: f64, sink: &mut impl EventSink) -> ActuatorCommand {
        let prev_mode = self.fsm.current_mode();

        // 1. Alerts
        let active_before = self.alerts.active_mask();
        self.state.alerts = self
            .alerts
            .evaluate(&self.state.sensors, &self.state.setpoints);
        for alert in &self.state.alerts {
            if active_before & alert.kind.mask() == 0 {
                sink.emit(&AppEvent::AlertRaised(alert.clone()));
            }
        }
        if active_before != 0 && self.alerts.active_mask() == 0 {
            sink.emit(&AppEvent::AlertsCleared);
        }

        // 2. Mode decision
        self.fsm.tick(&mut self.state);
        let mode = self.fsm.current_mode();
        if mode != prev_mode {
            sink.emit(&AppEvent::ModeChanged {
                from: prev_mode,
                to: mode,
            });
        }

        // 3. Actuator command: safe state only while an Emergency alert is
        // present this step, even if the mode stays latched.
        self.state.commands = if self.state.has_emergency_alert() {
            ActuatorCommand::safe_state()
        } else {
            self.compute_commands(dt_secs)
        };

        // 4. Energy
        self.state.energy_draw_w = power::instantaneous_draw_w(&self.state.commands);

        // 5. Physics
        self.model
            .advance(&mut self.state.sensors, &self.state.commands, dt_secs);

        // 6. History
        let step = self.history.len() as u64;
        self.history.push(HistoryRecord::snapshot(step, &self.state));

        debug!(
            "step {}: mode={:?} heater={:.1}% cooler={} led={:.0}% draw={:.1}W",
            step,
            mode,
            self.state.commands.heater_power_percent,
            self.state.commands.cooler_active,
            self.state.commands.led_power_percent,
            self.state.energy_draw_w
        );

        // 7. Telemetry
        let elapsed = self.state.sensors.elapsed_secs;
        if elapsed >= self.next_telemetry_secs {
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
            let interval = self.telemetry_interval_secs;
            self.next_telemetry_secs = ((elapsed / interval).floor() + 1.0) * interval;
        }

        self.state.commands
    }

    /// Normal-mode control computation.
    fn compute_commands(&mut self, dt_secs: f64) -> ActuatorCommand {
        let sp = self.state.setpoints;
        let s = self.state.sensors;

        let temp_out = self
            .loops
            .temperature
            .update(sp.temperature_c, s.temperature_c, dt_secs);
        let thermal = mapper::map_temperature(temp_out);

        let humidity_out = self
            .loops
            .humidity
            .update(sp.humidity_percent, s.humidity_percent, dt_secs);
        let humidity = mapper::map_humidity(humidity_out);

        let co2_out = self.loops.co2.update(sp.co2_ppm, s.co2_ppm, dt_secs);

        ActuatorCommand {
            heater_power_percent: thermal.heater_power_percent,
            cooler_active: thermal.cooler_active,
            misting_rate_ml_min: humidity.misting_rate_ml_min,
            vent_position_percent: humidity.vent_position_percent,
            co2_injection_rate_ml_min: mapper::map_co2(co2_out),
            led_power_percent: self.lighting.led_power_at(s.elapsed_secs),
            circulation_fan_rpm: mapper::fan_speed_rpm(self.state.temperature_error()),
        }
    }
}
