//! # Equipment Interface
//!
//! This module defines the narrow interfaces the arm software uses to talk to its equipment. The
//! equipment itself (vendor motor controller firmware, driver station joystick, dashboard) lives
//! outside this software, so only the boundary is described here.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod input;
pub mod motor;
pub mod telem;
