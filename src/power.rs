//! Energy accounting.
//!
//! The instantaneous draw is a pure function of the actuator command and
//! is recomputed every step before the plant update.  Integrating it over
//! a run into kWh is a reporting concern: [`total_energy_kwh`] works on a
//! finished history and is never called from inside the loop.

use crate::fsm::context::ActuatorCommand;
use crate::history::HistoryRecord;

/// Heater draw per percent of power (W), 200 W at full power.
const HEATER_W_PER_PERCENT: f64 = 2.0;
/// Cooler draw while active (W).
const COOLER_W: f64 = 60.0;
/// LED draw per percent of power (W), 100 W at full power.
const LED_W_PER_PERCENT: f64 = 1.0;
/// Fan draw per RPM (W), 40 W at 2000 RPM.
const FAN_W_PER_RPM: f64 = 0.02;

/// Instantaneous power draw (W) for one actuator command.
pub fn instantaneous_draw_w(cmd: &ActuatorCommand) -> f64 {
    let cooler = if cmd.cooler_active { COOLER_W } else { 0.0 };
    cmd.heater_power_percent * HEATER_W_PER_PERCENT
        + cooler
        + cmd.led_power_percent * LED_W_PER_PERCENT
        + cmd.circulation_fan_rpm * FAN_W_PER_RPM
}

/// Trapezoidal integral of `(hours, watts)` samples, in kWh.
///
/// Fewer than two samples integrate to zero.
pub fn integrate_kwh(samples: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let mut total_wh = 0.0;
    let mut prev: Option<(f64, f64)> = None;
    for (hours, watts) in samples {
        if let Some((h0, w0)) = prev {
            total_wh += (hours - h0) * (w0 + watts) / 2.0;
        }
        prev = Some((hours, watts));
    }
    total_wh / 1000.0
}

/// Total energy over a completed run, integrating the power recorded on
/// each step against the post-step simulation clock.
pub fn total_energy_kwh(history: &[HistoryRecord]) -> f64 {
    integrate_kwh(
        history
            .iter()
            .map(|r| (r.sensors.elapsed_hours(), r.energy_draw_w)),
    )
}
