//! Discrete-time physical model of the dome atmosphere.
//!
//! Advances the sensor readings by one step of `dt` seconds given the
//! actuator command that was in force during that step.  The model is
//! deliberately simple: each variable gets a linear rate of change from
//! the actuators plus a passive loss term.
//!
//! Domain bounds applied after each update:
//!
//! | Field       | Bound                                     |
//! |-------------|-------------------------------------------|
//! | temperature | floor at absolute zero, no ceiling        |
//! | humidity    | clamped to 0–100 %                        |
//! | CO₂         | floor at 0 ppm, no ceiling                |
//! | O₂          | clamped to 0–100 %                        |

use log::trace;

use crate::app::ports::EnvironmentModel;
use crate::fsm::context::{ActuatorCommand, SensorReadings};

/// Passive heat-loss target: lunar-night equilibrium inside the shell (°C).
pub const LUNAR_NIGHT_AMBIENT_C: f64 = -20.0;
/// Lowest physically meaningful temperature (°C).
pub const ABSOLUTE_ZERO_C: f64 = -273.15;

// Temperature (°C/s)
const HEATER_GAIN: f64 = 0.001;
const COOLER_RATE: f64 = 0.002;
const HEAT_LOSS_COEFF: f64 = 0.0001;

// Humidity (%/s)
const MIST_GAIN: f64 = 0.05;
const VENT_DRYING: f64 = 0.001;
const EVAPORATION_COEFF: f64 = 0.0005;

// CO₂ (ppm/min)
const INJECTION_GAIN: f64 = 10.0;
const PLANT_UPTAKE_PPM_PER_MIN: f64 = 5.0;
const VENT_CO2_LOSS: f64 = 0.5;

// O₂ (%/s) while the grow lights are above half power
const PHOTOSYNTHESIS_O2_RATE: f64 = 0.0001;
const PHOTOSYNTHESIS_LED_THRESHOLD: f64 = 50.0;

/// The reference lunar growth-dome plant.
#[derive(Debug, Clone, Copy, Default)]
pub struct LunarDomePlant;

impl LunarDomePlant {
    pub fn new() -> Self {
        Self
    }
}

impl EnvironmentModel for LunarDomePlant {
    fn advance(&mut self, sensors: &mut SensorReadings, cmd: &ActuatorCommand, dt_secs: f64) {
        // ── Temperature ───────────────────────────────────────────
        let cooling = if cmd.cooler_active { COOLER_RATE } else { 0.0 };
        let temp_rate = cmd.heater_power_percent * HEATER_GAIN
            - cooling
            - (sensors.temperature_c - LUNAR_NIGHT_AMBIENT_C) * HEAT_LOSS_COEFF;
        sensors.temperature_c = (sensors.temperature_c + temp_rate * dt_secs).max(ABSOLUTE_ZERO_C);

        // ── Humidity ──────────────────────────────────────────────
        let humidity_rate = cmd.misting_rate_ml_min * MIST_GAIN
            - cmd.vent_position_percent * VENT_DRYING
            - sensors.humidity_percent * EVAPORATION_COEFF;
        sensors.humidity_percent =
            (sensors.humidity_percent + humidity_rate * dt_secs).clamp(0.0, 100.0);

        // ── CO₂ (minute-based rate) ───────────────────────────────
        let co2_rate = cmd.co2_injection_rate_ml_min * INJECTION_GAIN
            - PLANT_UPTAKE_PPM_PER_MIN
            - cmd.vent_position_percent * VENT_CO2_LOSS;
        sensors.co2_ppm = (sensors.co2_ppm + co2_rate * dt_secs / 60.0).max(0.0);

        // ── O₂ ────────────────────────────────────────────────────
        let o2_rate = if cmd.led_power_percent > PHOTOSYNTHESIS_LED_THRESHOLD {
            PHOTOSYNTHESIS_O2_RATE
        } else {
            0.0
        };
        sensors.o2_percent = (sensors.o2_percent + o2_rate * dt_secs).clamp(0.0, 100.0);

        sensors.elapsed_secs += dt_secs;

        trace!(
            "plant: t={:.0}s T={:.2}°C H={:.1}% CO2={:.0}ppm O2={:.2}%",
            sensors.elapsed_secs,
            sensors.temperature_c,
            sensors.humidity_percent,
            sensors.co2_ppm,
            sensors.o2_percent
        );
    }
}
