//! # Arm Executable Parameters
//!
//! This module provide parameters for the arm executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::bindings::BindingParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ArmExecParams {

    /// Network endpoint the telemetry server publishes on
    pub tm_endpoint: String,

    /// Port of the operator's joystick on the driver station
    pub oper_joystick_port: u8,

    /// CAN bus ID of the arm motor controller
    pub arm_motor_can_id: u8,

    /// Joystick buttons bound to the arm presets
    pub bindings: BindingParams,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shipped_params() {
        let params: ArmExecParams = util::params::load_from(
            concat!(env!("CARGO_MANIFEST_DIR"), "/../params/arm_exec.toml")
        ).unwrap();

        assert_eq!(params.tm_endpoint, "tcp://*:5030");
        assert_eq!(params.oper_joystick_port, 1);
        assert_eq!(params.arm_motor_can_id, 1);
        assert_eq!(params.bindings, BindingParams::default());
    }
}
