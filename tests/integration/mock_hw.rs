//! Mock adapters for integration tests.
//!
//! `RecordingSink` keeps every emitted event so tests can assert on the
//! full event stream.  `ScriptedModel` runs the reference plant and then
//! overwrites selected readings after chosen steps, which is how tests
//! inject excursions such as a sudden O2 drop.

use domectl::app::events::AppEvent;
use domectl::app::ports::{EnvironmentModel, EventSink};
use domectl::fsm::ControlMode;
use domectl::fsm::context::{ActuatorCommand, SensorReadings};
use domectl::plant::LunarDomePlant;

// ── Recording event sink ──────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn mode_changes(&self) -> Vec<(ControlMode, ControlMode)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::ModeChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn last(&self) -> Option<&AppEvent> {
        self.events.last()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Scripted environment model ────────────────────────────────

/// A reading forced after the plant update of a given step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Override {
    Temperature(f64),
    Co2(f64),
    O2(f64),
}

pub struct ScriptedModel {
    plant: LunarDomePlant,
    step: u64,
    script: Vec<(u64, Override)>,
    /// Every command the controller handed to the model.
    pub commands: Vec<ActuatorCommand>,
}

#[allow(dead_code)]
impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            plant: LunarDomePlant::new(),
            step: 0,
            script: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Force a reading once step `step` (zero-based) has been simulated.
    pub fn after_step(mut self, step: u64, value: Override) -> Self {
        self.script.push((step, value));
        self
    }
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentModel for ScriptedModel {
    fn advance(&mut self, sensors: &mut SensorReadings, cmd: &ActuatorCommand, dt_secs: f64) {
        self.commands.push(*cmd);
        self.plant.advance(sensors, cmd, dt_secs);
        for (_, value) in self.script.iter().filter(|(s, _)| *s == self.step) {
            match *value {
                Override::Temperature(t) => sensors.temperature_c = t,
                Override::Co2(c) => sensors.co2_ppm = c,
                Override::O2(o) => sensors.o2_percent = o,
            }
        }
        self.step += 1;
    }
}
