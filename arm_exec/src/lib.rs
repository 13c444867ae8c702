//! # Arm library.
//!
//! This library allows other crates in the workspace (and the tests) to access items defined
//! inside the arm executable.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm control module - owns the arm setpoint and drives the arm motor towards it
pub mod arm_ctrl;

/// Command bindings - turns joystick button presses into arm commands
pub mod bindings;

/// Global data store for the executable
pub mod data_store;

/// Stand-in motor used when no motor controller is attached
pub mod dry_run;

/// Parameters for the arm executable
pub mod params;

/// Telecommand processor - routes TCs into the data store
pub mod tc_processor;

/// Telemetry server - publishes arm telemetry to the dashboard
pub mod tm_server;

#[cfg(test)]
pub(crate) mod mocks;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Target period of one cycle.
pub const CYCLE_PERIOD_S: f64 = 0.02;

/// Number of cycles per second
pub const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;
