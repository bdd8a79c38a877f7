//! Application core: the control loop, zero I/O.
//!
//! This module contains the orchestration rules for the dome: the
//! per-step control loop, reconfiguration commands, and outbound events.
//! All interaction with the plant and the outside world happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! with scripted models and recording sinks.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
