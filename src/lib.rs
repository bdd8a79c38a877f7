//! Lunar growth-dome life-support controller.
//!
//! Exposes the control core, the reference plant model, and the adapters
//! for integration testing and for embedding in a mission orchestrator.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod diagnostics;
pub mod error;
pub mod fsm;
pub mod history;
pub mod plant;
pub mod power;
pub mod safety;
pub mod scheduler;

pub use app::service::DomeController;
pub use error::{Error, Result};
