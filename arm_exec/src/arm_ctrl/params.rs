//! Parameters structure for ArmCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use comms_if::{
    eqpt::motor::{FeedbackDevice, NeutralMode},
    tc::arm_ctrl::Preset,
};

use super::ArmCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Arm control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {

    // ---- TRAVEL ----

    /// Lowest allowed arm position, also the bottom preset.
    ///
    /// Units: sensor ticks
    pub bottom_pos_ticks: f64,

    /// Middle preset position.
    ///
    /// Units: sensor ticks
    pub middle_pos_ticks: f64,

    /// Highest allowed arm position, also the top preset.
    ///
    /// Units: sensor ticks
    pub top_pos_ticks: f64,

    // ---- MOTOR CONFIGURATION ----

    /// Timeout applied to every configuration call.
    ///
    /// Units: milliseconds
    pub config_timeout_ms: u32,

    /// Closed loop index the feedback sensor is attached to.
    pub pid_loop_idx: u8,

    /// Gain slot the closed loop gains are written into.
    pub slot_idx: u8,

    pub feedback_device: FeedbackDevice,

    /// Set if the sensor counts the opposite way to the motor output.
    pub sensor_phase: bool,

    pub motor_inverted: bool,

    /// Behaviour of the motor when the demand is zero.
    pub neutral_mode: NeutralMode,

    /// Magnitude of the largest output the motor may apply, in both directions.
    ///
    /// Units: fraction of full output, in (0, 1]
    pub peak_output: f64,

    /// Closed loop error below which the motor stops correcting.
    ///
    /// Units: sensor ticks
    pub allowable_error_ticks: f64,

    pub k_p: f64,
    pub k_i: f64,
    pub k_d: f64,
    pub k_f: f64,

    /// If true a failed configuration step aborts initialisation, otherwise
    /// it is only warned about.
    pub strict_config: bool,

    // ---- MANUAL CONTROL ----

    /// Button which must be held for the joystick axis to move the arm.
    pub manual_control_button: u8,

    /// Joystick axis used to move the arm.
    pub arm_axis: u8,

    /// Joysticks report forward as negative, set this to flip the axis.
    pub invert_axis: bool,

    /// Change in target per cycle at full axis deflection.
    ///
    /// Units: sensor ticks
    pub speed_multiplier: f64,

    // ---- BEHAVIOUR ----

    pub preset_strategy: PresetStrategy,

    pub idle_behaviour: IdleBehaviour,

    /// Duration of a timed closed loop preset move.
    ///
    /// Units: seconds
    pub position_move_timeout_s: f64,

    /// Duration of an open loop speed move.
    ///
    /// Units: seconds
    pub percent_move_timeout_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How a preset command is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PresetStrategy {
    /// Only move the target, the idle cycle holds it from then on.
    Hold,

    /// Move the target and drive to it for `position_move_timeout_s` before
    /// returning to the idle cycle.
    Timed,
}

/// What the arm does when no timed move is running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IdleBehaviour {
    /// Integrate the joystick into the target and hold the target.
    Track,

    /// Drive nothing.
    Stop,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Params {
            bottom_pos_ticks: 0.0,
            middle_pos_ticks: 25000.0,
            top_pos_ticks: 50000.0,
            config_timeout_ms: 30,
            pid_loop_idx: 0,
            slot_idx: 0,
            feedback_device: FeedbackDevice::IntegratedSensor,
            sensor_phase: true,
            motor_inverted: false,
            neutral_mode: NeutralMode::Brake,
            peak_output: 0.05,
            allowable_error_ticks: 0.0,
            k_p: 0.1,
            k_i: 0.0,
            k_d: 0.0,
            k_f: 0.0,
            strict_config: true,
            manual_control_button: 1,
            arm_axis: 1,
            invert_axis: true,
            speed_multiplier: 50.0,
            preset_strategy: PresetStrategy::Hold,
            idle_behaviour: IdleBehaviour::Track,
            position_move_timeout_s: 5.0,
            percent_move_timeout_s: 2.0,
        }
    }
}

impl Params {
    /// Check that the parameters describe a usable arm.
    pub fn validate(&self) -> Result<(), ArmCtrlError> {
        let finite = [
            ("bottom_pos_ticks", self.bottom_pos_ticks),
            ("middle_pos_ticks", self.middle_pos_ticks),
            ("top_pos_ticks", self.top_pos_ticks),
            ("peak_output", self.peak_output),
            ("allowable_error_ticks", self.allowable_error_ticks),
            ("k_p", self.k_p),
            ("k_i", self.k_i),
            ("k_d", self.k_d),
            ("k_f", self.k_f),
            ("speed_multiplier", self.speed_multiplier),
            ("position_move_timeout_s", self.position_move_timeout_s),
            ("percent_move_timeout_s", self.percent_move_timeout_s),
        ];

        for (name, value) in finite.iter() {
            if !value.is_finite() {
                return Err(invalid(format!("{} must be finite, found {}", name, value)));
            }
        }

        if !(self.bottom_pos_ticks <= self.middle_pos_ticks
            && self.middle_pos_ticks <= self.top_pos_ticks)
        {
            return Err(invalid(format!(
                "presets must satisfy bottom <= middle <= top, found {} / {} / {}",
                self.bottom_pos_ticks, self.middle_pos_ticks, self.top_pos_ticks
            )));
        }

        if self.peak_output <= 0.0 || self.peak_output > 1.0 {
            return Err(invalid(format!(
                "peak_output must be in (0, 1], found {}",
                self.peak_output
            )));
        }

        if self.speed_multiplier < 0.0 {
            return Err(invalid(format!(
                "speed_multiplier cannot be negative, found {}",
                self.speed_multiplier
            )));
        }

        if self.allowable_error_ticks < 0.0 {
            return Err(invalid(format!(
                "allowable_error_ticks cannot be negative, found {}",
                self.allowable_error_ticks
            )));
        }

        if self.position_move_timeout_s <= 0.0 || self.percent_move_timeout_s <= 0.0 {
            return Err(invalid(String::from("move timeouts must be greater than zero")));
        }

        if self.config_timeout_ms == 0 {
            return Err(invalid(String::from("config_timeout_ms must be greater than zero")));
        }

        Ok(())
    }

    /// Position of the given preset.
    ///
    /// Units: sensor ticks
    pub fn preset_pos_ticks(&self, preset: Preset) -> f64 {
        match preset {
            Preset::Bottom => self.bottom_pos_ticks,
            Preset::Middle => self.middle_pos_ticks,
            Preset::Top => self.top_pos_ticks,
        }
    }
}

fn invalid(msg: String) -> ArmCtrlError {
    ArmCtrlError::InvalidParams(msg)
}
