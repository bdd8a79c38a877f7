//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events
//! through the `log` facade.  Whatever logger the binary installs decides
//! where they end up.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::safety::AlertLevel;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | step={} mode={:?} | t={:.1}h | T={:.1}\u{00b0}C H={:.1}% \
                     CO2={:.0}ppm O2={:.2}% | heater={:.0}% cooler={} led={:.0}% \
                     fan={:.0}rpm | {:.1}W | alert={}",
                    t.step,
                    t.mode,
                    t.sensors.elapsed_hours(),
                    t.sensors.temperature_c,
                    t.sensors.humidity_percent,
                    t.sensors.co2_ppm,
                    t.sensors.o2_percent,
                    t.commands.heater_power_percent,
                    if t.commands.cooler_active { "ON" } else { "OFF" },
                    t.commands.led_power_percent,
                    t.commands.circulation_fan_rpm,
                    t.energy_draw_w,
                    t.max_alert,
                );
            }
            AppEvent::ModeChanged { from, to } if to.is_normal() => {
                info!("MODE  | {:?} -> {:?}", from, to);
            }
            AppEvent::ModeChanged { from, to } => {
                warn!("MODE  | {:?} -> {:?}", from, to);
            }
            AppEvent::AlertRaised(alert) => match alert.level {
                AlertLevel::Emergency | AlertLevel::Critical => warn!("ALERT | {}", alert),
                AlertLevel::Warning | AlertLevel::Normal => info!("ALERT | {}", alert),
            },
            AppEvent::AlertsCleared => {
                info!("ALERT | all cleared");
            }
            AppEvent::SetpointsUpdated(sp) => {
                info!(
                    "CONFIG| setpoints T={:.1}\u{00b0}C H={:.1}% CO2={:.0}ppm photoperiod={:.1}h",
                    sp.temperature_c, sp.humidity_percent, sp.co2_ppm, sp.photoperiod_hours
                );
            }
            AppEvent::ControllersReset => {
                info!("CONFIG| feedback loops reset");
            }
            AppEvent::Started { dome_id, mode } => {
                info!("START | dome={} initial_mode={:?}", dome_id, mode);
            }
            AppEvent::RunCompleted {
                steps,
                total_energy_kwh,
            } => {
                info!("DONE  | steps={} energy={:.2}kWh", steps, total_energy_kwh);
            }
        }
    }
}
