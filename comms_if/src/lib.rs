//! # Communications interface crate.
//!
//! Provides the interfaces shared between the arm software and the equipment around it: the
//! motor controller, the operator's joystick, the telemetry dashboard and the telecommands used to
//! drive the arm.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Telecommand definitions
pub mod tc;

/// Interfaces to the equipment the arm software talks to (motor, joystick, dashboard)
pub mod eqpt;

/// Network module
pub mod net;
