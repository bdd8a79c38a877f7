//! Post-run diagnostics.
//!
//! [`RunMetrics`] condenses a finished run (final state plus history) into
//! the figures the mission orchestrator reports: energy totals, how far
//! the atmosphere ended from its targets, and how bad things got.

use serde::{Deserialize, Serialize};

use crate::fsm::ControlMode;
use crate::fsm::context::DomeState;
use crate::history::HistoryRecord;
use crate::power;
use crate::safety::AlertLevel;

/// Summary of one completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub dome_id: String,
    /// Completed steps (equals history length).
    pub steps: u64,
    /// Simulation clock at the end of the run.
    pub simulated_hours: f64,
    /// Trapezoidal integral of the recorded power draw.
    pub total_energy_kwh: f64,
    pub average_power_w: f64,
    pub energy_per_day_kwh: f64,
    pub final_mode: ControlMode,
    /// |setpoint − measured| at the end of the run.
    pub temperature_deviation_c: f64,
    pub humidity_deviation_percent: f64,
    pub co2_deviation_ppm: f64,
    pub o2_deviation_percent: f64,
    /// Highest alert level seen on any step.
    pub peak_alert: AlertLevel,
    /// Steps that ended in Emergency mode.
    pub emergency_steps: u64,
}

impl RunMetrics {
    /// Collect metrics from the final state and the complete history.
    pub fn collect(dome_id: &str, state: &DomeState, history: &[HistoryRecord]) -> Self {
        let total_energy_kwh = power::total_energy_kwh(history);

        let span_hours = match (history.first(), history.last()) {
            (Some(first), Some(last)) => {
                last.sensors.elapsed_hours() - first.sensors.elapsed_hours()
            }
            _ => 0.0,
        };
        let average_power_w = if span_hours > 0.0 {
            total_energy_kwh * 1000.0 / span_hours
        } else {
            history.last().map_or(0.0, |r| r.energy_draw_w)
        };

        let peak_alert = history
            .iter()
            .map(HistoryRecord::max_alert_level)
            .max()
            .unwrap_or(AlertLevel::Normal);
        let emergency_steps = history
            .iter()
            .filter(|r| r.mode == ControlMode::Emergency)
            .count() as u64;

        let sp = &state.setpoints;
        let s = &state.sensors;
        Self {
            dome_id: dome_id.into(),
            steps: history.len() as u64,
            simulated_hours: s.elapsed_hours(),
            total_energy_kwh,
            average_power_w,
            energy_per_day_kwh: average_power_w * 24.0 / 1000.0,
            final_mode: state.mode,
            temperature_deviation_c: (sp.temperature_c - s.temperature_c).abs(),
            humidity_deviation_percent: (sp.humidity_percent - s.humidity_percent).abs(),
            co2_deviation_ppm: (sp.co2_ppm - s.co2_ppm).abs(),
            o2_deviation_percent: (sp.o2_percent - s.o2_percent).abs(),
            peak_alert,
            emergency_steps,
        }
    }

    /// True if the run ended within `max_temperature_deviation_c` of the
    /// temperature target and never entered Emergency.
    pub fn is_environment_stable(&self, max_temperature_deviation_c: f64) -> bool {
        self.temperature_deviation_c <= max_temperature_deviation_c && self.emergency_steps == 0
    }
}
