//! # Motor Controller Interface
//!
//! The smart motor controller runs its own closed loop, so the arm software only has to push a
//! configuration once at startup and then issue one demand per cycle. Everything behind this trait
//! is vendor firmware.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Unified API for a smart motor controller with an integrated closed loop.
///
/// All `config_*` calls take a timeout in milliseconds. If the device does not acknowledge the
/// call within the timeout it shall return [`MotorError::Timeout`].
pub trait MotorInterface {
    /// Restore the factory default configuration.
    fn factory_default(&mut self, timeout_ms: u32) -> Result<(), MotorError>;

    /// Overwrite the selected sensor's position.
    ///
    /// Units: sensor ticks
    fn set_sensor_position(&mut self, pos_ticks: f64, timeout_ms: u32) -> Result<(), MotorError>;

    /// Set what the motor does when the demand is neutral.
    fn set_neutral_mode(&mut self, mode: NeutralMode) -> Result<(), MotorError>;

    /// Select the feedback sensor used by the given closed loop.
    fn config_feedback_sensor(
        &mut self,
        device: FeedbackDevice,
        pid_loop_idx: u8,
        timeout_ms: u32,
    ) -> Result<(), MotorError>;

    /// Set the sensor phase, `true` makes the sensor positive when the output is positive.
    fn set_sensor_phase(&mut self, phase: bool) -> Result<(), MotorError>;

    /// Invert the direction of the motor output.
    fn set_inverted(&mut self, inverted: bool) -> Result<(), MotorError>;

    /// Set the nominal (minimum) output in the given direction.
    ///
    /// Units: fraction of full output, between -1 and +1
    fn config_nominal_output(
        &mut self,
        dir: Direction,
        output: f64,
        timeout_ms: u32,
    ) -> Result<(), MotorError>;

    /// Set the peak (maximum) output in the given direction.
    ///
    /// Units: fraction of full output, between -1 and +1
    fn config_peak_output(
        &mut self,
        dir: Direction,
        output: f64,
        timeout_ms: u32,
    ) -> Result<(), MotorError>;

    /// Set the closed loop error inside which the output is held neutral.
    ///
    /// Units: sensor ticks
    fn config_allowable_error(
        &mut self,
        slot_idx: u8,
        error_ticks: f64,
        timeout_ms: u32,
    ) -> Result<(), MotorError>;

    /// Set one of the closed loop gains of the given slot.
    fn config_gain(
        &mut self,
        slot_idx: u8,
        gain: Gain,
        value: f64,
        timeout_ms: u32,
    ) -> Result<(), MotorError>;

    /// Issue a demand to the motor.
    ///
    /// The value is a fraction of full output for [`ControlMode::PercentOutput`] and a sensor
    /// position in ticks for [`ControlMode::Position`].
    fn set(&mut self, mode: ControlMode, value: f64) -> Result<(), MotorError>;

    /// Current position of the selected sensor.
    ///
    /// Units: sensor ticks
    fn sensor_position(&self) -> f64;

    /// Current velocity of the selected sensor.
    ///
    /// Units: sensor ticks per 100 ms
    fn sensor_velocity(&self) -> f64;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors reported by a motor controller.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MotorError {
    #[error("The motor controller did not acknowledge the call within {0} ms")]
    Timeout(u32),

    #[error("The motor controller rejected the call: {0}")]
    Rejected(String),

    #[error("The motor controller is not present on the bus")]
    NotPresent,
}

/// The way a demand is interpreted by the motor controller.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ControlMode {
    /// Open loop, the demand is a fraction of full output.
    PercentOutput,

    /// Closed loop on the selected sensor, the demand is a position in ticks.
    Position,
}

/// Behaviour of the motor when the demand is neutral.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum NeutralMode {
    Brake,
    Coast,
}

/// Sensors a motor controller can close its loop on.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum FeedbackDevice {
    /// The encoder built into the motor.
    IntegratedSensor,

    /// A quadrature encoder wired to the controller.
    QuadEncoder,

    /// An absolute encoder using pulse width.
    PulseWidthEncoded,
}

/// Output direction.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Closed loop gains held in a slot.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Gain {
    /// Feed forward
    F,

    /// Proportional
    P,

    /// Integral
    I,

    /// Derivative
    D,
}
