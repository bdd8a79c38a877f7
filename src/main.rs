//! Dome controller demo: headless 24 h growing run.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 Adapters (outer ring)                    │
//! │                                                          │
//! │  FileConfigStore      LogEventSink      LunarDomePlant   │
//! │  (ConfigPort)         (EventSink)       (EnvironmentModel)│
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ─────────────────   │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │          DomeController (pure logic)               │  │
//! │  │  alerts · FSM · PID ×3 · lighting · energy         │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `domectl [config.json] [history.bin]`
//!
//! Log verbosity follows `RUST_LOG` (default `info`).
//!
//! Without a config file the dome starts in Growing mode with default
//! setpoints.  When a second path is given, the finished history log is
//! written there in postcard encoding.

use anyhow::{Context, Result};

use domectl::DomeController;
use domectl::adapters::{FileConfigStore, LogEventSink};
use domectl::config::{RunPlan, SystemConfig};
use domectl::fsm::ControlMode;
use domectl::fsm::context::SensorReadings;

/// Stability bound used for the mission success check (°C).
const STABLE_TEMPERATURE_DEVIATION_C: f64 = 5.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next();
    let history_path = args.next();

    // ── 1. Configuration ──────────────────────────────────────
    let config = match &config_path {
        Some(path) => FileConfigStore::new(path)
            .load_or_default()
            .with_context(|| format!("loading config from {path}"))?,
        None => SystemConfig {
            initial_mode: ControlMode::Growing,
            ..SystemConfig::default()
        },
    };

    // ── 2. Cold, dry, CO2-starved dome ────────────────────────
    let initial = SensorReadings {
        temperature_c: 15.0,
        humidity_percent: 40.0,
        co2_ppm: 400.0,
        ..SensorReadings::default()
    };

    let mut dome = DomeController::new(config)
        .context("building controller")?
        .with_sensors(initial)
        .context("seeding sensors")?;
    let mut sink = LogEventSink::new();

    // ── 3. Run ────────────────────────────────────────────────
    let plan = RunPlan::default();
    let metrics = dome.run(&plan, &mut sink).context("running simulation")?;

    // ── 4. Report ─────────────────────────────────────────────
    let s = dome.sense();
    println!(
        "Dome {}: {} ({} steps, {:.1} h)",
        metrics.dome_id, metrics.final_mode, metrics.steps, metrics.simulated_hours
    );
    println!(
        "  Temperature : {:15.1} °C  (start {:.1})",
        s.temperature_c, initial.temperature_c
    );
    println!(
        "  Humidity    : {:15.1} %   (start {:.1})",
        s.humidity_percent, initial.humidity_percent
    );
    println!("  CO2         : {:15.0} ppm (start {:.0})", s.co2_ppm, initial.co2_ppm);
    println!("  O2          : {:15.2} %", s.o2_percent);
    println!("  Energy      : {:15.2} kWh", metrics.total_energy_kwh);
    println!("  Avg power   : {:15.1} W", metrics.average_power_w);
    println!("  Peak alert  : {:>15}", metrics.peak_alert);
    let stable = metrics.is_environment_stable(STABLE_TEMPERATURE_DEVIATION_C);
    println!("  Stable      : {:>15}", if stable { "yes" } else { "no" });

    if let Some(path) = history_path {
        let bytes = dome.history().to_bytes().context("encoding history")?;
        std::fs::write(&path, &bytes).with_context(|| format!("writing history to {path}"))?;
        println!("  History     : {} records -> {}", dome.history().len(), path);
    }

    Ok(())
}
