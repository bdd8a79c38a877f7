//! Dome state threaded through every mode handler and loop phase.
//!
//! `DomeState` is the single mutable entity of a run.  It contains the
//! latest sensor readings, the setpoints, the actuator command computed for
//! the current step, the alerts raised this step, and the instantaneous
//! power draw.  Alert evaluation borrows it read-only; the plant model
//! borrows its sensors mutably.

use serde::{Deserialize, Serialize};

use super::ControlMode;
use crate::config::EnvironmentalSetpoints;
use crate::control::mapper::FAN_MAX_RPM;
use crate::safety::AlertList;

/// Standard atmospheric pressure (Pa) maintained inside the dome.
pub const STANDARD_PRESSURE_PA: f64 = 101_325.0;

// ---------------------------------------------------------------------------
// Sensor readings (written by the plant model once per step)
// ---------------------------------------------------------------------------

/// A point-in-time snapshot of every dome sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReadings {
    /// Air temperature (°C).
    pub temperature_c: f64,
    /// Relative humidity (0–100 %).
    pub humidity_percent: f64,
    /// CO₂ concentration (ppm, ≥ 0).
    pub co2_ppm: f64,
    /// O₂ fraction (0–100 %).
    pub o2_percent: f64,
    /// Photosynthetic photon flux (µmol/m²/s).
    pub light_intensity_umol: f64,
    /// Ambient pressure (Pa).
    pub pressure_pa: f64,
    /// Regolith substrate moisture (0–100 %).
    pub substrate_moisture_percent: f64,
    /// Simulated seconds since the run started.
    pub elapsed_secs: f64,
}

impl Default for SensorReadings {
    fn default() -> Self {
        Self {
            temperature_c: 20.0,
            humidity_percent: 60.0,
            co2_ppm: 400.0,
            o2_percent: 20.9,
            light_intensity_umol: 0.0,
            pressure_pa: STANDARD_PRESSURE_PA,
            substrate_moisture_percent: 50.0,
            elapsed_secs: 0.0,
        }
    }
}

impl SensorReadings {
    /// Simulated hours since the run started.
    pub fn elapsed_hours(&self) -> f64 {
        self.elapsed_secs / 3600.0
    }

    /// True if the atmosphere readings are physically possible: humidity
    /// and O₂ within [0, 100] %, CO₂ not negative, temperature not below
    /// absolute zero.
    pub fn is_in_domain(&self) -> bool {
        (0.0..=100.0).contains(&self.humidity_percent)
            && (0.0..=100.0).contains(&self.o2_percent)
            && self.co2_ppm >= 0.0
            && self.temperature_c >= crate::plant::ABSOLUTE_ZERO_C
    }

    /// True if every field is a finite number.
    pub fn is_finite(&self) -> bool {
        [
            self.temperature_c,
            self.humidity_percent,
            self.co2_ppm,
            self.o2_percent,
            self.light_intensity_umol,
            self.pressure_pa,
            self.substrate_moisture_percent,
            self.elapsed_secs,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

// ---------------------------------------------------------------------------
// Actuator command (derived fresh each step)
// ---------------------------------------------------------------------------

/// Actuator outputs for one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuatorCommand {
    /// Heater power (0–100 %).
    pub heater_power_percent: f64,
    pub cooler_active: bool,
    /// Mister flow (mL/min).
    pub misting_rate_ml_min: f64,
    /// Vent position (0–100 %).
    pub vent_position_percent: f64,
    /// CO₂ injection flow (mL/min).
    pub co2_injection_rate_ml_min: f64,
    /// Grow-light power (0–100 %).
    pub led_power_percent: f64,
    /// Circulation fan speed (RPM).
    pub circulation_fan_rpm: f64,
}

impl Default for ActuatorCommand {
    fn default() -> Self {
        Self {
            heater_power_percent: 0.0,
            cooler_active: false,
            misting_rate_ml_min: 0.0,
            vent_position_percent: 0.0,
            co2_injection_rate_ml_min: 0.0,
            led_power_percent: 0.0,
            circulation_fan_rpm: 0.0,
        }
    }
}

impl ActuatorCommand {
    /// All actuators idle.
    pub fn all_off() -> Self {
        Self::default()
    }

    /// Fixed Emergency command: everything off except a full ventilation
    /// purge (vent wide open, fan at maximum).
    pub const fn safe_state() -> Self {
        Self {
            heater_power_percent: 0.0,
            cooler_active: false,
            misting_rate_ml_min: 0.0,
            vent_position_percent: 100.0,
            co2_injection_rate_ml_min: 0.0,
            led_power_percent: 0.0,
            circulation_fan_rpm: FAN_MAX_RPM,
        }
    }
}

// ---------------------------------------------------------------------------
// DomeState
// ---------------------------------------------------------------------------

/// The aggregate state owned by the control loop.
#[derive(Debug, Clone)]
pub struct DomeState {
    /// Currently active mode (mirrors the FSM).
    pub mode: ControlMode,
    /// Latest sensor readings.
    pub sensors: SensorReadings,
    /// Environmental targets for this run.
    pub setpoints: EnvironmentalSetpoints,
    /// Command computed on the most recent step.
    pub commands: ActuatorCommand,
    /// Alerts raised on the most recent step.
    pub alerts: AlertList,
    /// Instantaneous power draw for `commands` (W).
    pub energy_draw_w: f64,
}

impl DomeState {
    pub fn new(
        mode: ControlMode,
        sensors: SensorReadings,
        setpoints: EnvironmentalSetpoints,
    ) -> Self {
        Self {
            mode,
            sensors,
            setpoints,
            commands: ActuatorCommand::all_off(),
            alerts: AlertList::new(),
            energy_draw_w: 0.0,
        }
    }

    /// True if any alert raised this step is Emergency-severity.
    pub fn has_emergency_alert(&self) -> bool {
        crate::safety::has_emergency(&self.alerts)
    }

    /// Signed temperature error (setpoint − measured).
    pub fn temperature_error(&self) -> f64 {
        self.setpoints.temperature_c - self.sensors.temperature_c
    }
}

impl Default for DomeState {
    fn default() -> Self {
        Self::new(
            ControlMode::Standby,
            SensorReadings::default(),
            EnvironmentalSetpoints::default(),
        )
    }
}
