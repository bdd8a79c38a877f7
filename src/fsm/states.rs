//! Concrete mode handler functions and table builder.
//!
//! ```text
//!  STANDBY · CONDITIONING · GROWING · MAINTENANCE
//!     │        (switched only by external SetMode)
//!     │
//!     └──[Emergency-severity alert]──▶ EMERGENCY (latched)
//!     ▲                                    │
//!     └────────[external SetMode]──────────┘
//! ```
//!
//! The mode is a label: the service picks the actuator command after the
//! FSM step from that step's alerts.  Emergency installs the safe-state
//! command on entry; while the label stays latched, steps without an
//! Emergency alert run the full control computation again.

use super::context::{ActuatorCommand, DomeState};
use super::{ControlMode, StateDescriptor};
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static mode table.  Called once per controller.
pub fn build_state_table() -> [StateDescriptor; ControlMode::COUNT] {
    [
        // Index 0: Standby
        StateDescriptor {
            id: ControlMode::Standby,
            name: "Standby",
            on_enter: Some(standby_enter),
            on_exit: None,
            on_update: normal_update,
        },
        // Index 1: Conditioning
        StateDescriptor {
            id: ControlMode::Conditioning,
            name: "Conditioning",
            on_enter: Some(conditioning_enter),
            on_exit: None,
            on_update: normal_update,
        },
        // Index 2: Growing
        StateDescriptor {
            id: ControlMode::Growing,
            name: "Growing",
            on_enter: Some(growing_enter),
            on_exit: None,
            on_update: normal_update,
        },
        // Index 3: Maintenance
        StateDescriptor {
            id: ControlMode::Maintenance,
            name: "Maintenance",
            on_enter: Some(maintenance_enter),
            on_exit: None,
            on_update: normal_update,
        },
        // Index 4: Emergency
        StateDescriptor {
            id: ControlMode::Emergency,
            name: "Emergency",
            on_enter: Some(emergency_enter),
            on_exit: Some(emergency_exit),
            on_update: emergency_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Normal modes
// ═══════════════════════════════════════════════════════════════════════════

fn standby_enter(_ctx: &mut DomeState) {
    info!("STANDBY: dome idle, control loops tracking setpoints");
}

fn conditioning_enter(ctx: &mut DomeState) {
    info!(
        "CONDITIONING: substrate moisture {:.1}%",
        ctx.sensors.substrate_moisture_percent
    );
}

fn growing_enter(ctx: &mut DomeState) {
    info!(
        "GROWING: photoperiod {:.1}h, T={:.1}°C H={:.1}% CO2={:.0}ppm",
        ctx.setpoints.photoperiod_hours,
        ctx.setpoints.temperature_c,
        ctx.setpoints.humidity_percent,
        ctx.setpoints.co2_ppm
    );
}

fn maintenance_enter(_ctx: &mut DomeState) {
    info!("MAINTENANCE: crew access mode");
}

/// Shared by every normal mode: the only automatic transition is the
/// escalation to Emergency.
fn normal_update(ctx: &mut DomeState) -> Option<ControlMode> {
    if ctx.has_emergency_alert() {
        return Some(ControlMode::Emergency);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  EMERGENCY: latched label, safe state on entry
// ═══════════════════════════════════════════════════════════════════════════

fn emergency_enter(ctx: &mut DomeState) {
    ctx.commands = ActuatorCommand::safe_state();
    warn!(
        "EMERGENCY: safe state engaged (O2={:.1}%, CO2={:.0}ppm), {} alert(s)",
        ctx.sensors.o2_percent,
        ctx.sensors.co2_ppm,
        ctx.alerts.len()
    );
}

fn emergency_exit(_ctx: &mut DomeState) {
    info!("EMERGENCY: cleared by operator, resuming normal control");
}

fn emergency_update(_ctx: &mut DomeState) -> Option<ControlMode> {
    // Stay latched until an operator selects a normal mode.
    None
}
