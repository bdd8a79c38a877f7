//! System configuration parameters
//!
//! Setpoints, controller gains, and run planning for one growth dome.
//! Values can be overridden between runs through the
//! [`ConfigPort`](crate::app::ports::ConfigPort); nothing here changes
//! while a run is in progress.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fsm::ControlMode;

/// Target environmental parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalSetpoints {
    /// Target air temperature (°C).
    pub temperature_c: f64,
    /// Allowed ± deviation from `temperature_c` (°C).
    pub temperature_tolerance: f64,
    /// Target relative humidity (%).
    pub humidity_percent: f64,
    /// Allowed ± deviation from `humidity_percent` (%).
    pub humidity_tolerance: f64,
    /// Target CO₂ concentration (ppm).
    pub co2_ppm: f64,
    /// Allowed ± deviation from `co2_ppm` (ppm).
    pub co2_tolerance: f64,
    /// Target O₂ fraction (%).
    pub o2_percent: f64,
    /// Allowed ± deviation from `o2_percent` (%).
    pub o2_tolerance: f64,
    /// Target photosynthetic photon flux (µmol/m²/s).
    pub light_intensity_umol: f64,
    /// Hours of light per 24 h cycle.
    pub photoperiod_hours: f64,
}

impl Default for EnvironmentalSetpoints {
    fn default() -> Self {
        Self {
            temperature_c: 22.0,
            temperature_tolerance: 2.0,
            humidity_percent: 65.0,
            humidity_tolerance: 10.0,
            co2_ppm: 800.0,
            co2_tolerance: 200.0,
            o2_percent: 20.9,
            o2_tolerance: 1.0,
            light_intensity_umol: 300.0,
            photoperiod_hours: 16.0,
        }
    }
}

impl EnvironmentalSetpoints {
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.temperature_c,
            self.temperature_tolerance,
            self.humidity_percent,
            self.humidity_tolerance,
            self.co2_ppm,
            self.co2_tolerance,
            self.o2_percent,
            self.o2_tolerance,
            self.light_intensity_umol,
            self.photoperiod_hours,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::Config("setpoints must be finite"));
        }
        if self.temperature_tolerance <= 0.0
            || self.humidity_tolerance <= 0.0
            || self.co2_tolerance <= 0.0
            || self.o2_tolerance <= 0.0
        {
            return Err(Error::Config("tolerances must be positive"));
        }
        if !(0.0..=100.0).contains(&self.humidity_percent)
            || !(0.0..=100.0).contains(&self.o2_percent)
        {
            return Err(Error::Config("humidity and O2 setpoints must be within 0-100%"));
        }
        if self.co2_ppm < 0.0 || self.light_intensity_umol < 0.0 {
            return Err(Error::Config("CO2 and light setpoints must be non-negative"));
        }
        if !(0.0..=24.0).contains(&self.photoperiod_hours) {
            return Err(Error::Config("photoperiod must be within 0-24 hours"));
        }
        Ok(())
    }
}

/// Gain triple and output bounds for one feedback loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub output_min: f64,
    pub output_max: f64,
}

impl PidGains {
    pub const fn new(kp: f64, ki: f64, kd: f64, output_min: f64, output_max: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            output_min,
            output_max,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite()) {
            return Err(Error::Config("PID gains must be finite"));
        }
        if !self.output_min.is_finite()
            || !self.output_max.is_finite()
            || self.output_min > self.output_max
        {
            return Err(Error::InvalidBounds {
                min: self.output_min,
                max: self.output_max,
            });
        }
        Ok(())
    }
}

/// Gains for the three independent feedback loops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Bidirectional: positive heats, negative cools.
    pub temperature: PidGains,
    /// Bidirectional: positive mists, negative vents.
    pub humidity: PidGains,
    /// Injection only; the floor stays at zero.
    pub co2: PidGains,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            temperature: PidGains::new(2.0, 0.1, 0.5, -100.0, 100.0),
            humidity: PidGains::new(1.5, 0.05, 0.3, -100.0, 100.0),
            co2: PidGains::new(0.5, 0.02, 0.1, 0.0, 100.0),
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Unique identifier for this dome.
    pub dome_id: String,
    /// Environmental targets.
    pub setpoints: EnvironmentalSetpoints,
    /// Feedback loop tuning.
    pub control: ControlConfig,
    /// Mode the dome starts in.
    pub initial_mode: ControlMode,
    /// Simulated seconds between telemetry events.
    pub telemetry_interval_secs: f64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            dome_id: String::from("DOME-001"),
            setpoints: EnvironmentalSetpoints::default(),
            control: ControlConfig::default(),
            initial_mode: ControlMode::Standby,
            telemetry_interval_secs: 3600.0, // hourly
        }
    }
}

impl SystemConfig {
    /// Validate every field.  Called by the controller constructor and by
    /// config stores before persisting.
    pub fn validate(&self) -> Result<()> {
        if self.dome_id.trim().is_empty() {
            return Err(Error::Config("dome id must not be empty"));
        }
        self.setpoints.validate()?;
        self.control.temperature.validate()?;
        self.control.humidity.validate()?;
        self.control.co2.validate()?;
        if !(self.telemetry_interval_secs.is_finite() && self.telemetry_interval_secs > 0.0) {
            return Err(Error::Config("telemetry interval must be positive"));
        }
        Ok(())
    }
}

/// Duration and step size of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunPlan {
    pub duration_hours: f64,
    pub step_secs: f64,
}

impl RunPlan {
    /// Build a plan, rejecting non-positive or non-finite values.
    pub fn new(duration_hours: f64, step_secs: f64) -> Result<Self> {
        let plan = Self {
            duration_hours,
            step_secs,
        };
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.duration_hours.is_finite() && self.duration_hours > 0.0) {
            return Err(Error::InvalidRun("duration must be positive and finite"));
        }
        if !(self.step_secs.is_finite() && self.step_secs > 0.0) {
            return Err(Error::InvalidRun("step size must be positive and finite"));
        }
        Ok(())
    }

    /// Number of steps the run executes: `ceil(duration × 3600 / dt)`.
    pub fn step_count(&self) -> Result<u64> {
        self.validate()?;
        let steps = (self.duration_hours * 3600.0 / self.step_secs).ceil();
        if !steps.is_finite() || steps > u64::MAX as f64 {
            return Err(Error::InvalidRun("step count overflows"));
        }
        Ok(steps as u64)
    }
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            duration_hours: 24.0,
            step_secs: 60.0,
        }
    }
}
