//! Feedback control: the PID primitive and the mapping from loop outputs
//! to actuator settings.

pub mod mapper;
pub mod pid;
