//! Motor configuration sequence
//!
//! The arm motor is configured once at start up, one step at a time and always in the order of
//! [`ConfigStep::SEQUENCE`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use comms_if::eqpt::motor::{Direction, Gain, MotorError, MotorInterface};

use super::Params;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A single motor configuration call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfigStep {
    FactoryDefault,
    ResetSensor,
    NeutralMode,
    FeedbackSensor,
    SensorPhase,
    Inverted,
    NominalOutput(Direction),
    PeakOutput(Direction),
    AllowableError,
    Gain(Gain),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ConfigStep {
    /// Every configuration step, in the order they are applied.
    pub const SEQUENCE: [ConfigStep; 15] = [
        ConfigStep::FactoryDefault,
        ConfigStep::ResetSensor,
        ConfigStep::NeutralMode,
        ConfigStep::FeedbackSensor,
        ConfigStep::SensorPhase,
        ConfigStep::Inverted,
        ConfigStep::NominalOutput(Direction::Forward),
        ConfigStep::NominalOutput(Direction::Reverse),
        ConfigStep::PeakOutput(Direction::Forward),
        ConfigStep::PeakOutput(Direction::Reverse),
        ConfigStep::AllowableError,
        ConfigStep::Gain(Gain::F),
        ConfigStep::Gain(Gain::P),
        ConfigStep::Gain(Gain::I),
        ConfigStep::Gain(Gain::D),
    ];

    /// Apply this step to the motor using the values in `params`.
    pub fn apply<M: MotorInterface>(&self, motor: &mut M, params: &Params) -> Result<(), MotorError> {
        let timeout_ms = params.config_timeout_ms;

        match *self {
            ConfigStep::FactoryDefault => motor.factory_default(timeout_ms),
            ConfigStep::ResetSensor => motor.set_sensor_position(0.0, timeout_ms),
            ConfigStep::NeutralMode => motor.set_neutral_mode(params.neutral_mode),
            ConfigStep::FeedbackSensor => motor.config_feedback_sensor(
                params.feedback_device,
                params.pid_loop_idx,
                timeout_ms,
            ),
            ConfigStep::SensorPhase => motor.set_sensor_phase(params.sensor_phase),
            ConfigStep::Inverted => motor.set_inverted(params.motor_inverted),
            ConfigStep::NominalOutput(dir) => motor.config_nominal_output(dir, 0.0, timeout_ms),
            ConfigStep::PeakOutput(dir) => {
                let output = match dir {
                    Direction::Forward => params.peak_output,
                    Direction::Reverse => -params.peak_output,
                };
                motor.config_peak_output(dir, output, timeout_ms)
            }
            ConfigStep::AllowableError => motor.config_allowable_error(
                params.slot_idx,
                params.allowable_error_ticks,
                timeout_ms,
            ),
            ConfigStep::Gain(gain) => {
                let value = match gain {
                    Gain::F => params.k_f,
                    Gain::P => params.k_p,
                    Gain::I => params.k_i,
                    Gain::D => params.k_d,
                };
                motor.config_gain(params.slot_idx, gain, value, timeout_ms)
            }
        }
    }
}
