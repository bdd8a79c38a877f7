//! Function-pointer finite state machine for the dome's operating mode.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌──────────────┬───────────┬──────────┬───────────────────┐ │
//! │  │ ControlMode  │ on_enter  │ on_exit  │ on_update         │ │
//! │  ├──────────────┼───────────┼──────────┼───────────────────┤ │
//! │  │ Standby      │ fn(ctx)   │ -        │ fn(ctx)->Option<> │ │
//! │  │ Conditioning │ fn(ctx)   │ -        │ fn(ctx)->Option<> │ │
//! │  │ Growing      │ fn(ctx)   │ -        │ fn(ctx)->Option<> │ │
//! │  │ Maintenance  │ fn(ctx)   │ -        │ fn(ctx)->Option<> │ │
//! │  │ Emergency    │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  └──────────────┴───────────┴──────────┴───────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each step the engine calls `on_update` for the **current** mode after
//! alerts have been written into the [`DomeState`].  If it returns
//! `Some(next)`, the engine runs `on_exit` for the current mode, then
//! `on_enter` for the next, and mirrors the new mode into `DomeState.mode`.

pub mod context;
pub mod states;

use core::fmt;

use context::DomeState;
use log::info;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// Top-level operating modes of the dome.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ControlMode {
    Standby = 0,
    Conditioning = 1,
    Growing = 2,
    Maintenance = 3,
    Emergency = 4,
}

impl ControlMode {
    /// Total number of modes: used to size the table array.
    pub const COUNT: usize = 5;

    /// Convert an index back to `ControlMode`.  Panics on out-of-range in
    /// debug builds; returns `Emergency` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Standby,
            1 => Self::Conditioning,
            2 => Self::Growing,
            3 => Self::Maintenance,
            4 => Self::Emergency,
            _ => {
                debug_assert!(false, "invalid mode index: {idx}");
                Self::Emergency
            }
        }
    }

    /// Human-readable description used in reports.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standby => "Standby",
            Self::Conditioning => "Substrate conditioning",
            Self::Growing => "Active growing",
            Self::Maintenance => "Maintenance",
            Self::Emergency => "Emergency mode",
        }
    }

    /// False only for the latched Emergency mode.
    pub const fn is_normal(self) -> bool {
        !matches!(self, Self::Emergency)
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each transition.
pub type StateActionFn = fn(&mut DomeState);

/// Signature for the per-step update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut DomeState) -> Option<ControlMode>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single mode.
pub struct StateDescriptor {
    pub id: ControlMode,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The mode state machine.
///
/// Owns the table (array of [`StateDescriptor`]) and the index of the
/// active mode; the [`DomeState`] is threaded through every handler call.
pub struct Fsm {
    /// Fixed-size table indexed by `ControlMode as usize`.
    table: [StateDescriptor; ControlMode::COUNT],
    /// Index of the currently active mode.
    current: usize,
    /// Monotonically increasing step counter.
    tick_count: u64,
    /// Step at which the current mode was entered.
    state_entry_tick: u64,
}

impl Fsm {
    /// Construct a new FSM with the given table, starting in `initial`.
    pub fn new(table: [StateDescriptor; ControlMode::COUNT], initial: ControlMode) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Run the initial `on_enter` for the starting mode.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut DomeState) {
        info!("FSM starting in mode: {}", self.table[self.current].name);
        ctx.mode = self.current_mode();
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one step.
    ///
    /// 1. Call `on_update` for the current mode.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut DomeState) {
        self.tick_count += 1;

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.force_transition(next_id, ctx);
        }
    }

    /// Force an immediate transition (external reconfiguration).
    /// A transition to the mode already active is a no-op.
    pub fn force_transition(&mut self, next: ControlMode, ctx: &mut DomeState) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current mode.
    pub fn current_mode(&self) -> ControlMode {
        ControlMode::from_index(self.current)
    }

    /// How many steps the FSM has spent in the current mode.
    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: ControlMode, ctx: &mut DomeState) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;
        ctx.mode = next_id;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::context::DomeState;
    use super::*;
    use crate::safety;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn hypoxia_always_reaches_emergency(
            o2_trace in proptest::collection::vec(0.0f64..40.0, 1..60),
        ) {
            let mut fsm = Fsm::new(states::build_state_table(), ControlMode::Growing);
            let mut ctx = DomeState::default();
            fsm.start(&mut ctx);

            let mut seen_hypoxia = false;
            for o2 in o2_trace {
                ctx.sensors.o2_percent = o2;
                ctx.alerts = safety::evaluate(&ctx.sensors, &ctx.setpoints);
                fsm.tick(&mut ctx);
                seen_hypoxia |= o2 < safety::O2_HYPOXIA_PERCENT;

                prop_assert_eq!(fsm.current_mode() == ControlMode::Emergency, seen_hypoxia);
                prop_assert_eq!(ctx.mode, fsm.current_mode());
            }
        }
    }
}
