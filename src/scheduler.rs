//! Photoperiod lighting scheduler.
//!
//! Maps simulated time onto LED power for the grow lights.  The day is
//! split into four windows relative to the photoperiod `P`:
//!
//! ```text
//!  100% ┤        ┌──────────────────────┐
//!       │       ╱                        ╲
//!    0% ┼──────┘                          └───────────────
//!       0h     1h                   P−1h  P             24h
//!        sunrise      full power      sunset    dark
//! ```
//!
//! Ramp windows are always one simulated hour, whatever `P` is.

use log::debug;

/// Length of the sunrise and sunset ramps (hours).
const RAMP_HOURS: f64 = 1.0;

const HOURS_PER_DAY: f64 = 24.0;
const SECS_PER_HOUR: f64 = 3600.0;

// ═══════════════════════════════════════════════════════════════
//  Day phase
// ═══════════════════════════════════════════════════════════════

/// Which lighting window an hour-of-day falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightPhase {
    Sunrise,
    Day,
    Sunset,
    Night,
}

/// Wrap an arbitrary hour count onto a 24 h clock (`0.0..24.0`).
pub fn hour_of_day(hours: f64) -> f64 {
    let h = hours.rem_euclid(HOURS_PER_DAY);
    // rem_euclid can round up to exactly 24.0 for tiny negatives.
    if h >= HOURS_PER_DAY { 0.0 } else { h }
}

/// Hour of day for a simulation clock expressed in seconds.
pub fn hour_of_day_from_secs(elapsed_secs: f64) -> f64 {
    hour_of_day(elapsed_secs / SECS_PER_HOUR)
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

/// Stateless photoperiod scheduler.
#[derive(Debug, Clone, Copy)]
pub struct PhotoperiodScheduler {
    photoperiod_hours: f64,
}

impl PhotoperiodScheduler {
    pub fn new(photoperiod_hours: f64) -> Self {
        Self { photoperiod_hours }
    }

    pub fn photoperiod_hours(&self) -> f64 {
        self.photoperiod_hours
    }

    /// Update the photoperiod (takes effect on the next query).
    pub fn set_photoperiod(&mut self, hours: f64) {
        debug!("Scheduler: photoperiod {:.1}h -> {:.1}h", self.photoperiod_hours, hours);
        self.photoperiod_hours = hours;
    }

    /// Classify an hour of day (wrapped mod 24).
    pub fn phase(&self, hour: f64) -> LightPhase {
        let h = hour_of_day(hour);
        let p = self.photoperiod_hours;
        if h >= p {
            LightPhase::Night
        } else if h < RAMP_HOURS {
            LightPhase::Sunrise
        } else if h > p - RAMP_HOURS {
            LightPhase::Sunset
        } else {
            LightPhase::Day
        }
    }

    /// LED power (0–100 %) for the given hour of day.
    pub fn led_power(&self, hour: f64) -> f64 {
        let h = hour_of_day(hour);
        let power = match self.phase(h) {
            LightPhase::Night => 0.0,
            LightPhase::Sunrise => h / RAMP_HOURS * 100.0,
            LightPhase::Sunset => (self.photoperiod_hours - h) / RAMP_HOURS * 100.0,
            LightPhase::Day => 100.0,
        };
        power.clamp(0.0, 100.0)
    }

    /// LED power for a simulation clock in seconds since start.
    pub fn led_power_at(&self, elapsed_secs: f64) -> f64 {
        self.led_power(hour_of_day_from_secs(elapsed_secs))
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
