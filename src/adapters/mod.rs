//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements   | Connects to             |
//! |---------------|--------------|-------------------------|
//! | `log_sink`    | EventSink    | `log` facade            |
//! | `file_config` | ConfigPort   | JSON file on disk       |
//!
//! The reference plant model lives in [`crate::plant`] and implements
//! [`EnvironmentModel`](crate::app::ports::EnvironmentModel).

pub mod file_config;
pub mod log_sink;

pub use file_config::FileConfigStore;
pub use log_sink::LogEventSink;
