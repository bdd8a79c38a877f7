//! Outbound application events.
//!
//! The [`DomeController`](super::service::DomeController) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them: write them to the log,
//! record them for a test, forward them to a mission dashboard.

use crate::config::EnvironmentalSetpoints;
use crate::fsm::ControlMode;
use crate::fsm::context::{ActuatorCommand, SensorReadings};
use crate::safety::{Alert, AlertLevel};

/// Structured events emitted by the control core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The controller has started (carries identity and initial mode).
    Started { dome_id: String, mode: ControlMode },

    /// The mode changed, either by escalation or by command.
    ModeChanged { from: ControlMode, to: ControlMode },

    /// A variable started alarming on this step.
    AlertRaised(Alert),

    /// Every previously alarming variable is back inside its band.
    AlertsCleared,

    /// New setpoints were accepted between steps.
    SetpointsUpdated(EnvironmentalSetpoints),

    /// All three feedback loops were reset.
    ControllersReset,

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// A fixed-length run finished.
    RunCompleted { steps: u64, total_energy_kwh: f64 },
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    /// Index of the step that produced this snapshot.
    pub step: u64,
    pub mode: ControlMode,
    pub sensors: SensorReadings,
    pub commands: ActuatorCommand,
    pub energy_draw_w: f64,
    /// Highest alert level raised on the step.
    pub max_alert: AlertLevel,
}
