//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications 
//! interface.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod arm_ctrl;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Serialize, Deserialize};
use thiserror::Error;

// Internal
use crate::eqpt::input::JoystickState;
use arm_ctrl::ArmCmd;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the arm by the operator or a
/// script.
///
/// In JSON a TC is written as `{"type": "<TYPE>", "payload": <payload>}`,
/// where TCs without a payload omit the `payload` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum Tc {
    /// Put the arm into safe mode, holding its current position.
    #[serde(rename = "SAFE")]
    MakeSafe,

    /// Leave safe mode.
    #[serde(rename = "UNSAFE")]
    MakeUnsafe,

    /// A command for arm control.
    #[serde(rename = "ARM")]
    ArmCtrl(ArmCmd),

    /// A new snapshot of the operator's joystick.
    #[serde(rename = "JOY")]
    Joystick(JoystickState),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

/// Response to a telecommand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TcResponse {
    /// The TC was accepted and will be executed
    Ok,

    /// The TC cannot be executed in the current mode (e.g. safe mode)
    CannotExecute,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }
}
