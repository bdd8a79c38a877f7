//! Controller output → actuator command mapping.
//!
//! Each function takes the scalar output of one PID loop and turns it into
//! physically meaningful actuator settings.  All functions are pure.

/// mL/min of misting per unit of positive humidity output.
const MIST_ML_PER_UNIT: f64 = 0.5;
/// Dehumidification never opens the vent past this position (%).
const HUMIDITY_VENT_LIMIT_PERCENT: f64 = 50.0;
/// mL/min of CO₂ injection per unit of CO₂ loop output.
const CO2_ML_PER_UNIT: f64 = 0.1;

/// Idle circulation fan speed (RPM).
pub const FAN_BASE_RPM: f64 = 500.0;
/// Extra RPM per °C of temperature error.
const FAN_RPM_PER_DEGREE: f64 = 100.0;
/// Upper bound on the temperature-driven boost (RPM).
const FAN_BOOST_LIMIT_RPM: f64 = 1500.0;
/// Highest fan speed the dome ever commands (RPM).
pub const FAN_MAX_RPM: f64 = FAN_BASE_RPM + FAN_BOOST_LIMIT_RPM;

/// Heater and cooler settings derived from the temperature loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalCommand {
    /// Heater power (0–100 %).
    pub heater_power_percent: f64,
    pub cooler_active: bool,
}

/// Mister and vent settings derived from the humidity loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HumidityCommand {
    pub misting_rate_ml_min: f64,
    /// Vent position (0–100 %).
    pub vent_position_percent: f64,
}

/// Positive output heats; any negative output switches the cooler on.
pub fn map_temperature(output: f64) -> ThermalCommand {
    if output > 0.0 {
        ThermalCommand {
            heater_power_percent: output,
            cooler_active: false,
        }
    } else {
        ThermalCommand {
            heater_power_percent: 0.0,
            cooler_active: output < 0.0,
        }
    }
}

/// Positive output mists; non-positive output opens the vent (capped at 50 %).
pub fn map_humidity(output: f64) -> HumidityCommand {
    if output > 0.0 {
        HumidityCommand {
            misting_rate_ml_min: output * MIST_ML_PER_UNIT,
            vent_position_percent: 0.0,
        }
    } else {
        HumidityCommand {
            misting_rate_ml_min: 0.0,
            vent_position_percent: output.abs().min(HUMIDITY_VENT_LIMIT_PERCENT),
        }
    }
}

/// CO₂ injection rate in mL/min.  Negative outputs are discarded even
/// though the loop's own floor already sits at zero.
pub fn map_co2(output: f64) -> f64 {
    (output * CO2_ML_PER_UNIT).max(0.0)
}

/// Circulation fan speed: 500 RPM base plus 100 RPM per °C of error,
/// boost capped at 1500 RPM.  Independent of the PID outputs.
pub fn fan_speed_rpm(temperature_error_c: f64) -> f64 {
    let boost = (temperature_error_c.abs() * FAN_RPM_PER_DEGREE).min(FAN_BOOST_LIMIT_RPM);
    (FAN_BASE_RPM + boost).min(FAN_MAX_RPM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_temperature_output_heats() {
        let t = map_temperature(42.5);
        assert_eq!(t.heater_power_percent, 42.5);
        assert!(!t.cooler_active);
    }

    #[test]
    fn negative_temperature_output_cools() {
        let t = map_temperature(-3.0);
        assert_eq!(t.heater_power_percent, 0.0);
        assert!(t.cooler_active);
    }

    #[test]
    fn zero_temperature_output_is_idle() {
        let t = map_temperature(0.0);
        assert_eq!(t.heater_power_percent, 0.0);
        assert!(!t.cooler_active);
    }

    #[test]
    fn humidity_positive_mists_with_closed_vent() {
        let h = map_humidity(40.0);
        assert_eq!(h.misting_rate_ml_min, 20.0);
        assert_eq!(h.vent_position_percent, 0.0);
    }

    #[test]
    fn humidity_negative_vents_up_to_half_open() {
        let h = map_humidity(-30.0);
        assert_eq!(h.misting_rate_ml_min, 0.0);
        assert_eq!(h.vent_position_percent, 30.0);

        let h = map_humidity(-100.0);
        assert_eq!(h.vent_position_percent, HUMIDITY_VENT_LIMIT_PERCENT);
    }

    #[test]
    fn co2_scales_and_never_goes_negative() {
        assert!((map_co2(100.0) - 10.0).abs() < 1e-12);
        assert_eq!(map_co2(-50.0), 0.0);
    }

    #[test]
    fn fan_tracks_error_and_saturates() {
        assert_eq!(fan_speed_rpm(0.0), 500.0);
        assert_eq!(fan_speed_rpm(-5.0), 1000.0);
        assert_eq!(fan_speed_rpm(7.0), 1200.0);
        assert_eq!(fan_speed_rpm(40.0), FAN_MAX_RPM);
        assert_eq!(FAN_MAX_RPM, 2000.0);
    }
}
