//! # Arm control telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command that can be completed by arm control.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum ArmCmd {
    /// Move the arm to one of the preset positions.
    ///
    /// Depending on the arm control parameters the preset is either held
    /// indefinitely or driven to for a bounded time.
    MoveToPreset {
        preset: Preset,
    },

    /// Drive the arm open loop for a bounded time.
    SetSpeed {
        /// Fraction of full output, between -1 and +1.
        speed: f64,
    },

    /// Stop the arm, holding the current position.
    Stop,

    /// Zero the arm's position sensor at the current position.
    ResetPosition,
}

/// The preset arm positions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Preset {
    Bottom,
    Middle,
    Top,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Bottom => write!(f, "bottom"),
            Preset::Middle => write!(f, "middle"),
            Preset::Top => write!(f, "top"),
        }
    }
}
