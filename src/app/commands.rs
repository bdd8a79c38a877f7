//! Inbound commands to the control core.
//!
//! These represent reconfiguration requested by the outside world (an
//! operator console, the mission orchestrator, a test) that the
//! [`DomeController`](super::service::DomeController) applies between
//! steps, never in the middle of one.

use crate::config::EnvironmentalSetpoints;
use crate::fsm::ControlMode;

/// Commands that external adapters can send into the control core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Select an operating mode.  The only way out of Emergency.
    SetMode(ControlMode),

    /// Replace the environmental targets (validated before use).
    UpdateSetpoints(EnvironmentalSetpoints),

    /// Clear the integral and derivative memory of all three loops.
    ResetControllers,
}
