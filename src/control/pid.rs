//! PID controller for the dome's feedback loops
//!
//! One instance each regulates temperature, humidity, and CO₂.  The
//! setpoint is passed on every call so a reconfigured target takes effect
//! on the next step without rebuilding the controller.

use crate::config::PidGains;
use crate::error::{Error, Result};

/// Symmetric anti-windup band for the integral accumulator.
pub const INTEGRAL_LIMIT: f64 = 100.0;

/// PID controller
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    integral: f64,
    last_error: f64,
    output_min: f64,
    output_max: f64,
}

impl PidController {
    /// Build a controller.  Fails if `output_min > output_max` or a bound
    /// is not finite.
    pub fn new(kp: f64, ki: f64, kd: f64, output_min: f64, output_max: f64) -> Result<Self> {
        Self::from_gains(&PidGains::new(kp, ki, kd, output_min, output_max))
    }

    pub fn from_gains(gains: &PidGains) -> Result<Self> {
        gains.validate()?;
        Ok(Self {
            kp: gains.kp,
            ki: gains.ki,
            kd: gains.kd,
            integral: 0.0,
            last_error: 0.0,
            output_min: gains.output_min,
            output_max: gains.output_max,
        })
    }

    /// Set output limits
    pub fn set_limits(&mut self, min: f64, max: f64) -> Result<()> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(Error::InvalidBounds { min, max });
        }
        self.output_min = min;
        self.output_max = max;
        Ok(())
    }

    /// Compute the control output for one step.
    ///
    /// With `dt <= 0` the accumulator and last error are left untouched:
    /// the stored integral is still scaled by `ki`, the derivative is zero.
    pub fn update(&mut self, setpoint: f64, measured: f64, dt: f64) -> f64 {
        let error = setpoint - measured;

        // Proportional
        let p = self.kp * error;

        let (i, d) = if dt > 0.0 {
            // Integral (with anti-windup)
            self.integral = (self.integral + error * dt).clamp(-INTEGRAL_LIMIT, INTEGRAL_LIMIT);

            // Derivative
            let derivative = (error - self.last_error) / dt;
            self.last_error = error;

            (self.ki * self.integral, self.kd * derivative)
        } else {
            (self.ki * self.integral, 0.0)
        };

        // Clamp output
        (p + i + d).clamp(self.output_min, self.output_max)
    }

    /// Reset controller state.  Gains and bounds are kept.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn last_error(&self) -> f64 {
        self.last_error
    }

    pub fn limits(&self) -> (f64, f64) {
        (self.output_min, self.output_max)
    }
}
