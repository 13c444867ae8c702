//! Arm control module
//!
//! Holds the single source of truth for where the arm should be (the target position), keeps it
//! inside the travel limits, and turns operator input and commands into exactly one motor demand
//! per cycle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod config;
mod params;
mod state;


// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use config::*;
pub use params::*;
pub use state::*;

use comms_if::eqpt::motor::MotorError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ArmCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ArmCtrlError {
    #[error("Could not load the ArmCtrl parameters: {0}")]
    ParamsLoad(#[from] util::params::LoadError),

    #[error("Invalid ArmCtrl parameters: {0}")]
    InvalidParams(String),

    #[error("Arm motor configuration failed at step {step:?}: {source}")]
    Configuration {
        step: ConfigStep,
        source: MotorError,
    },

    #[error("ArmCtrl has not been configured, cannot drive the arm")]
    NotConfigured,

    #[error("Could not drive the arm motor: {0}")]
    Drive(MotorError),
}
