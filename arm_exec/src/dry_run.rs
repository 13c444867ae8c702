//! # Dry run motor
//!
//! Stands in for the arm motor controller when none is attached. Configuration is recorded and
//! logged, position demands are echoed straight back as the sensor reading, and the velocity is
//! the change in that reading over one cycle. There is no physics here, the arm is assumed to be
//! wherever it was last told to go.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, trace};
use serde::Serialize;

use comms_if::eqpt::motor::{
    ControlMode, Direction, FeedbackDevice, Gain, MotorError, MotorInterface, NeutralMode,
};

use crate::CYCLE_PERIOD_S;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Motor which only pretends to move.
#[derive(Debug)]
pub struct DryRunMotor {
    can_id: u8,

    config: DryRunConfig,

    pos_ticks: f64,

    /// Units: sensor ticks per 100 ms
    vel_ticks_per_100ms: f64,

    last_demand: Option<(ControlMode, f64)>,
}

/// The configuration the motor has been given.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DryRunConfig {
    pub neutral_mode: Option<NeutralMode>,
    pub feedback_device: Option<FeedbackDevice>,
    pub sensor_phase: bool,
    pub inverted: bool,
    pub nominal_output: [f64; 2],
    pub peak_output: [f64; 2],
    pub allowable_error_ticks: f64,

    /// Gains in F, P, I, D order
    pub gains: [f64; 4],
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DryRunMotor {
    pub fn new(can_id: u8) -> Self {
        Self {
            can_id,
            config: DryRunConfig::default(),
            pos_ticks: 0.0,
            vel_ticks_per_100ms: 0.0,
            last_demand: None,
        }
    }

    pub fn config(&self) -> &DryRunConfig {
        &self.config
    }

    pub fn last_demand(&self) -> Option<(ControlMode, f64)> {
        self.last_demand
    }
}

impl MotorInterface for DryRunMotor {
    fn factory_default(&mut self, _timeout_ms: u32) -> Result<(), MotorError> {
        debug!("[DryRun {}] Factory default", self.can_id);
        self.config = DryRunConfig::default();
        Ok(())
    }

    fn set_sensor_position(&mut self, pos_ticks: f64, _timeout_ms: u32) -> Result<(), MotorError> {
        debug!("[DryRun {}] Sensor position set to {}", self.can_id, pos_ticks);
        self.pos_ticks = pos_ticks;
        self.vel_ticks_per_100ms = 0.0;
        Ok(())
    }

    fn set_neutral_mode(&mut self, mode: NeutralMode) -> Result<(), MotorError> {
        debug!("[DryRun {}] Neutral mode {:?}", self.can_id, mode);
        self.config.neutral_mode = Some(mode);
        Ok(())
    }

    fn config_feedback_sensor(
        &mut self,
        device: FeedbackDevice,
        pid_loop_idx: u8,
        _timeout_ms: u32,
    ) -> Result<(), MotorError> {
        debug!(
            "[DryRun {}] Feedback sensor {:?} on loop {}",
            self.can_id, device, pid_loop_idx
        );
        self.config.feedback_device = Some(device);
        Ok(())
    }

    fn set_sensor_phase(&mut self, phase: bool) -> Result<(), MotorError> {
        self.config.sensor_phase = phase;
        Ok(())
    }

    fn set_inverted(&mut self, inverted: bool) -> Result<(), MotorError> {
        self.config.inverted = inverted;
        Ok(())
    }

    fn config_nominal_output(
        &mut self,
        dir: Direction,
        output: f64,
        _timeout_ms: u32,
    ) -> Result<(), MotorError> {
        self.config.nominal_output[dir_idx(dir)] = output;
        Ok(())
    }

    fn config_peak_output(
        &mut self,
        dir: Direction,
        output: f64,
        _timeout_ms: u32,
    ) -> Result<(), MotorError> {
        debug!("[DryRun {}] Peak output {:?} {}", self.can_id, dir, output);
        self.config.peak_output[dir_idx(dir)] = output;
        Ok(())
    }

    fn config_allowable_error(
        &mut self,
        _slot_idx: u8,
        error_ticks: f64,
        _timeout_ms: u32,
    ) -> Result<(), MotorError> {
        self.config.allowable_error_ticks = error_ticks;
        Ok(())
    }

    fn config_gain(
        &mut self,
        slot_idx: u8,
        gain: Gain,
        value: f64,
        _timeout_ms: u32,
    ) -> Result<(), MotorError> {
        debug!("[DryRun {}] Slot {} gain {:?} = {}", self.can_id, slot_idx, gain, value);
        let idx = match gain {
            Gain::F => 0,
            Gain::P => 1,
            Gain::I => 2,
            Gain::D => 3,
        };
        self.config.gains[idx] = value;
        Ok(())
    }

    fn set(&mut self, mode: ControlMode, value: f64) -> Result<(), MotorError> {
        if !value.is_finite() {
            return Err(MotorError::Rejected(format!("non-finite demand {}", value)));
        }

        trace!("[DryRun {}] {:?} {}", self.can_id, mode, value);

        let prev_pos_ticks = self.pos_ticks;
        if mode == ControlMode::Position {
            self.pos_ticks = value;
        }
        self.vel_ticks_per_100ms = (self.pos_ticks - prev_pos_ticks) * (0.1 / CYCLE_PERIOD_S);
        self.last_demand = Some((mode, value));

        Ok(())
    }

    fn sensor_position(&self) -> f64 {
        self.pos_ticks
    }

    fn sensor_velocity(&self) -> f64 {
        self.vel_ticks_per_100ms
    }
}

fn dir_idx(dir: Direction) -> usize {
    match dir {
        Direction::Forward => 0,
        Direction::Reverse => 1,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_echoes_position() {
        let mut m = DryRunMotor::new(5);

        m.set(ControlMode::Position, 1000.0).unwrap();
        assert_eq!(m.sensor_position(), 1000.0);
        assert!((m.sensor_velocity() - 5000.0).abs() < 1e-9);

        // Open loop demands don't move it
        m.set(ControlMode::PercentOutput, 0.5).unwrap();
        assert_eq!(m.sensor_position(), 1000.0);
        assert_eq!(m.sensor_velocity(), 0.0);
        assert_eq!(m.last_demand(), Some((ControlMode::PercentOutput, 0.5)));

        assert!(m.set(ControlMode::Position, f64::NAN).is_err());
    }

    #[test]
    fn test_records_config() {
        let mut m = DryRunMotor::new(5);

        m.config_peak_output(Direction::Reverse, -0.05, 30).unwrap();
        m.config_gain(0, Gain::P, 0.1, 30).unwrap();
        m.set_neutral_mode(NeutralMode::Brake).unwrap();

        assert_eq!(m.config().peak_output, [0.0, -0.05]);
        assert_eq!(m.config().gains, [0.0, 0.1, 0.0, 0.0]);
        assert_eq!(m.config().neutral_mode, Some(NeutralMode::Brake));

        m.factory_default(30).unwrap();
        assert_eq!(m.config(), &DryRunConfig::default());
    }
}
