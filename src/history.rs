//! Append-only run history.
//!
//! One [`HistoryRecord`] is appended at the end of every completed step.
//! Records are never mutated after they are pushed, so an index into the
//! log is a stable handle to "the dome as it was after step N".
//!
//! A finished log can be encoded with `postcard` for persistence.  Only do
//! that after the run completes; the log has a single writer.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::EnvironmentalSetpoints;
use crate::error::{Error, Result};
use crate::fsm::ControlMode;
use crate::fsm::context::{ActuatorCommand, DomeState, SensorReadings};
use crate::safety::{self, AlertLevel, AlertList};

/// Immutable snapshot of [`DomeState`] taken after one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Zero-based index of the step this record closes.
    pub step: u64,
    pub mode: ControlMode,
    /// Readings after the plant update.
    pub sensors: SensorReadings,
    pub setpoints: EnvironmentalSetpoints,
    /// Command that was in force during the step.
    pub commands: ActuatorCommand,
    /// Alerts raised at the start of the step.
    pub alerts: AlertList,
    /// Power draw during the step (W).
    pub energy_draw_w: f64,
}

impl HistoryRecord {
    pub fn snapshot(step: u64, state: &DomeState) -> Self {
        Self {
            step,
            mode: state.mode,
            sensors: state.sensors,
            setpoints: state.setpoints,
            commands: state.commands,
            alerts: state.alerts.clone(),
            energy_draw_w: state.energy_draw_w,
        }
    }

    /// Highest alert level raised on this step.
    pub fn max_alert_level(&self) -> AlertLevel {
        safety::max_level(&self.alerts)
    }
}

/// Ordered, append-only log of step records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryLog {
    records: Vec<HistoryRecord>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make room for `steps` more records so a run does not reallocate as
    /// it goes.  Best effort: a failed reservation leaves the log growing
    /// on demand.
    pub fn reserve(&mut self, steps: usize) {
        if self.records.try_reserve(steps).is_err() {
            debug!("history: cannot pre-size for {} steps", steps);
        }
    }

    /// Append the record for the next step.
    ///
    /// Records must arrive in step order with no gaps; anything else is a
    /// programming error in the loop driver.
    pub fn push(&mut self, record: HistoryRecord) {
        debug_assert_eq!(
            record.step,
            self.records.len() as u64,
            "history must be appended in step order"
        );
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, step: usize) -> Option<&HistoryRecord> {
        self.records.get(step)
    }

    pub fn last(&self) -> Option<&HistoryRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, HistoryRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Extract one value per step, e.g. a temperature series for plotting.
    pub fn series<F>(&self, f: F) -> Vec<f64>
    where
        F: Fn(&HistoryRecord) -> f64,
    {
        self.records.iter().map(f).collect()
    }

    /// Encode the completed log with postcard.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        postcard::to_allocvec(self).map_err(|_| Error::Storage("history encode failed"))
    }

    /// Decode a log previously produced by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let log: Self =
            postcard::from_bytes(bytes).map_err(|_| Error::Storage("history decode failed"))?;
        let ordered = log
            .records
            .iter()
            .enumerate()
            .all(|(i, r)| r.step == i as u64);
        if !ordered {
            return Err(Error::Storage("history records out of order"));
        }
        Ok(log)
    }
}

impl<'a> IntoIterator for &'a HistoryLog {
    type Item = &'a HistoryRecord;
    type IntoIter = core::slice::Iter<'a, HistoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
