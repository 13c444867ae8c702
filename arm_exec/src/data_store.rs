//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{error, info, warn};

use comms_if::eqpt::{input::JoystickState, motor::MotorInterface, telem::TelemetrySink};
use util::module::State;

use crate::{
    arm_ctrl::{self, ArmCtrl, ArmCtrlError},
    bindings::Bindings,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of consecutive ArmCtrl processing errors allowed before safe mode is engaged.
pub const MAX_ARM_CTRL_ERROR_LIMIT: u64 = 5;

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the arm has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    MakeSafeTc,
    ArmCtrlFault,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
pub struct DataStore<M, S> {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time at the start of the cycle
    pub time_s: f64,

    // Safe mode variables
    /// Determines if the arm is in safe mode.
    pub safe: bool,

    /// Gives the reason for the arm being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // Operator input
    /// Latest joystick snapshot, kept across cycles until a new one arrives.
    pub joystick: JoystickState,

    pub bindings: Bindings,

    // ArmCtrl
    pub arm_ctrl: ArmCtrl<M, S>,
    pub arm_ctrl_input: arm_ctrl::InputData,
    pub arm_ctrl_output: Option<arm_ctrl::DriveDemand>,
    pub arm_ctrl_status_rpt: arm_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive ArmCtrl processing errors
    pub num_consec_arm_ctrl_errors: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl<M, S> DataStore<M, S>
where
    M: MotorInterface,
    S: TelemetrySink,
{
    pub fn new(arm_ctrl: ArmCtrl<M, S>, bindings: Bindings) -> Self {
        Self {
            num_cycles: 0,
            is_1_hz_cycle: false,
            time_s: 0.0,
            safe: false,
            safe_cause: None,
            joystick: JoystickState::default(),
            bindings,
            arm_ctrl,
            arm_ctrl_input: arm_ctrl::InputData::default(),
            arm_ctrl_output: None,
            arm_ctrl_status_rpt: arm_ctrl::StatusReport::default(),
            num_consec_cycle_overruns: 0,
            num_consec_arm_ctrl_errors: 0,
        }
    }

    /// Puts the arm into safe mode with the given cause.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);

            // Make arm_ctrl safe
            self.arm_ctrl.make_safe();
            self.arm_ctrl_input.cmd = None;
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `Ok(())` if this cause was cleared and safe mode was disabled, or `Err(())`
    /// otherwise. To remove safe mode the provided cause must match the initial reason for safe
    /// mode being enabled.
    ///
    /// If safe mode was not enabled `Ok(())` is returned
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) => {
                if cause == root_cause {
                    self.safe = false;
                    self.safe_cause = None;
                    self.num_consec_arm_ctrl_errors = 0;

                    // Buttons held through safe mode must not fire on exit
                    self.bindings.poll(&self.joystick);

                    info!("Make unsafe requested, root cause match, safe mode disabled");
                    Ok(())
                } else {
                    Err(())
                }
            }
            None => Ok(()),
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u128) == 0;

        self.arm_ctrl_input = arm_ctrl::InputData::default();
        self.arm_ctrl_output = None;
        self.arm_ctrl_status_rpt = arm_ctrl::StatusReport::default();

        self.time_s = util::session::get_elapsed_seconds();
    }

    /// Build the ArmCtrl input from the operator's joystick.
    ///
    /// Must be called after telecommand processing. In safe mode the joystick and the bindings
    /// are ignored. A telecommanded arm command takes priority over a button press on the same
    /// cycle.
    pub fn prepare_arm_ctrl_input(&mut self) {
        if self.safe {
            self.arm_ctrl_input.joystick = JoystickState::default();
            self.arm_ctrl_input.cmd = None;
            return;
        }

        let bound_cmd = self.bindings.poll(&self.joystick);
        if self.arm_ctrl_input.cmd.is_none() {
            self.arm_ctrl_input.cmd = bound_cmd;
        }

        self.arm_ctrl_input.joystick = self.joystick.clone();
    }

    /// Run ArmCtrl processing, engaging safe mode if it keeps failing.
    pub fn proc_arm_ctrl(&mut self) {
        match self.arm_ctrl.proc(&self.arm_ctrl_input) {
            Ok((o, r)) => {
                self.arm_ctrl_output = Some(o);
                self.arm_ctrl_status_rpt = r;
                self.num_consec_arm_ctrl_errors = 0;
            }
            Err(e) => {
                warn!("Error during ArmCtrl processing: {}", e);

                if let ArmCtrlError::Drive(_) = e {
                    self.num_consec_arm_ctrl_errors += 1;
                }

                if self.num_consec_arm_ctrl_errors > MAX_ARM_CTRL_ERROR_LIMIT {
                    if !self.safe {
                        error!(
                            "Maximum number of consecutive ArmCtrl errors ({}) has been exceeded",
                            MAX_ARM_CTRL_ERROR_LIMIT
                        );
                    }
                    self.make_safe(SafeModeCause::ArmCtrlFault);
                }
            }
        }
    }

    /// Mark the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }
}
