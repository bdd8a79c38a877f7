//! Alert evaluation.
//!
//! The evaluator runs **every step before the mode decision** and turns the
//! current sensor readings into a ranked list of [`Alert`]s.  Alerts are
//! recomputed from scratch each step; the only lasting effect of an alert
//! is the mode change it may cause.
//!
//! ## Rules
//!
//! | Variable    | Condition                     | Level     |
//! |-------------|-------------------------------|-----------|
//! | Temperature | \|error\| > 3 × tolerance     | Critical  |
//! | Temperature | \|error\| > 2 × tolerance     | Warning   |
//! | Humidity    | \|error\| > 2 × tolerance     | Warning   |
//! | CO₂         | > 5000 ppm                    | Critical  |
//! | CO₂         | < 200 ppm                     | Warning   |
//! | O₂          | < 18 %                        | Emergency |
//! | O₂          | > 23 %                        | Critical  |
//!
//! Each variable raises at most one alert per step, so the list never
//! holds more than [`MAX_ALERTS`] entries.

use core::fmt::{self, Write as _};

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::EnvironmentalSetpoints;
use crate::fsm::context::SensorReadings;

/// One alert per monitored variable at most.
pub const MAX_ALERTS: usize = 4;

/// CO₂ toxicity threshold (ppm).
pub const CO2_TOXIC_PPM: f64 = 5000.0;
/// Below this CO₂ level plant growth stalls (ppm).
pub const CO2_GROWTH_LIMIT_PPM: f64 = 200.0;
/// Hypoxia threshold (%).
pub const O2_HYPOXIA_PERCENT: f64 = 18.0;
/// Fire-hazard threshold (%).
pub const O2_FIRE_HAZARD_PERCENT: f64 = 23.0;

const TEMP_CRITICAL_FACTOR: f64 = 3.0;
const TEMP_WARNING_FACTOR: f64 = 2.0;
const HUMIDITY_WARNING_FACTOR: f64 = 2.0;

// ---------------------------------------------------------------------------
// Alert types
// ---------------------------------------------------------------------------

/// Alert severity, ordered from benign to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AlertLevel {
    Normal = 0,
    Warning = 1,
    Critical = 2,
    Emergency = 3,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
            Self::Emergency => write!(f, "emergency"),
        }
    }
}

/// The monitored variable an alert refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AlertKind {
    Temperature = 0b0001,
    Humidity = 0b0010,
    Co2 = 0b0100,
    Oxygen = 0b1000,
}

impl AlertKind {
    /// Return the bitmask for this kind.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

/// A single (severity, message) pair raised for one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub kind: AlertKind,
    pub message: heapless::String<64>,
}

impl Alert {
    fn new(level: AlertLevel, kind: AlertKind, args: fmt::Arguments<'_>) -> Self {
        let mut message = heapless::String::new();
        // Every template fits at capacity once readings go through `Reading`.
        let _ = message.write_fmt(args);
        Self {
            level,
            kind,
            message,
        }
    }
}

/// A reading rendered with fixed decimals, or in scientific notation past
/// 1e9 so that an alert message has bounded length.
struct Reading(f64, usize);

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.abs() < 1.0e9 {
            write!(f, "{:.*}", self.1, self.0)
        } else {
            write!(f, "{:.1e}", self.0)
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Fixed-capacity alert list for one step.
pub type AlertList = heapless::Vec<Alert, MAX_ALERTS>;

/// Highest severity in `alerts`, or `Normal` if there are none.
pub fn max_level(alerts: &[Alert]) -> AlertLevel {
    alerts
        .iter()
        .map(|a| a.level)
        .max()
        .unwrap_or(AlertLevel::Normal)
}

/// True if any alert in the list is Emergency-severity.
pub fn has_emergency(alerts: &[Alert]) -> bool {
    alerts.iter().any(|a| a.level == AlertLevel::Emergency)
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Check every monitored variable against its setpoint and the absolute
/// safety thresholds.  Pure: the same inputs always produce the same list.
pub fn evaluate(sensors: &SensorReadings, setpoints: &EnvironmentalSetpoints) -> AlertList {
    let mut alerts = AlertList::new();
    let mut push = |alert: Alert| {
        // Capacity equals the number of kinds, each raised at most once.
        let _ = alerts.push(alert);
    };

    // ── Temperature ───────────────────────────────────────────
    let temp_error = (sensors.temperature_c - setpoints.temperature_c).abs();
    if temp_error > setpoints.temperature_tolerance * TEMP_CRITICAL_FACTOR {
        push(Alert::new(
            AlertLevel::Critical,
            AlertKind::Temperature,
            format_args!(
                "Temperature {}°C critically out of range",
                Reading(sensors.temperature_c, 1)
            ),
        ));
    } else if temp_error > setpoints.temperature_tolerance * TEMP_WARNING_FACTOR {
        push(Alert::new(
            AlertLevel::Warning,
            AlertKind::Temperature,
            format_args!("Temperature {}°C outside tolerance", Reading(sensors.temperature_c, 1)),
        ));
    }

    // ── Humidity ──────────────────────────────────────────────
    let humidity_error = (sensors.humidity_percent - setpoints.humidity_percent).abs();
    if humidity_error > setpoints.humidity_tolerance * HUMIDITY_WARNING_FACTOR {
        push(Alert::new(
            AlertLevel::Warning,
            AlertKind::Humidity,
            format_args!("Humidity {}% outside tolerance", Reading(sensors.humidity_percent, 1)),
        ));
    }

    // ── CO₂ ───────────────────────────────────────────────────
    if sensors.co2_ppm > CO2_TOXIC_PPM {
        push(Alert::new(
            AlertLevel::Critical,
            AlertKind::Co2,
            format_args!("CO2 level {} ppm dangerously high", Reading(sensors.co2_ppm, 0)),
        ));
    } else if sensors.co2_ppm < CO2_GROWTH_LIMIT_PPM {
        push(Alert::new(
            AlertLevel::Warning,
            AlertKind::Co2,
            format_args!("CO2 level {} ppm too low for plant growth", Reading(sensors.co2_ppm, 0)),
        ));
    }

    // ── O₂ ────────────────────────────────────────────────────
    if sensors.o2_percent < O2_HYPOXIA_PERCENT {
        push(Alert::new(
            AlertLevel::Emergency,
            AlertKind::Oxygen,
            format_args!("Oxygen level {}% critically low", Reading(sensors.o2_percent, 1)),
        ));
    } else if sensors.o2_percent > O2_FIRE_HAZARD_PERCENT {
        push(Alert::new(
            AlertLevel::Critical,
            AlertKind::Oxygen,
            format_args!("Oxygen level {}% fire hazard", Reading(sensors.o2_percent, 1)),
        ));
    }

    alerts
}

// ---------------------------------------------------------------------------
// Evaluator with transition logging
// ---------------------------------------------------------------------------

/// Wraps [`evaluate`] and logs when a variable starts or stops alarming.
///
/// The remembered bitmask only deduplicates log lines; it never feeds back
/// into the alert list.
#[derive(Debug, Default)]
pub struct AlertEvaluator {
    /// Kinds that alarmed on the previous step.
    active: u8,
}

impl AlertEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate all rules for this step.
    pub fn evaluate(
        &mut self,
        sensors: &SensorReadings,
        setpoints: &EnvironmentalSetpoints,
    ) -> AlertList {
        let alerts = evaluate(sensors, setpoints);

        let mut now = 0u8;
        for alert in &alerts {
            now |= alert.kind.mask();
            if self.active & alert.kind.mask() == 0 {
                match alert.level {
                    AlertLevel::Emergency => error!("ALERT RAISED: {alert}"),
                    AlertLevel::Critical | AlertLevel::Warning => warn!("ALERT RAISED: {alert}"),
                    AlertLevel::Normal => info!("ALERT RAISED: {alert}"),
                }
            }
        }
        let cleared = self.active & !now;
        if cleared != 0 {
            info!("ALERTS CLEARED: mask=0b{:04b}", cleared);
        }
        self.active = now;

        alerts
    }

    /// Bitmask of kinds that alarmed on the last evaluation.
    pub fn active_mask(&self) -> u8 {
        self.active
    }
}
