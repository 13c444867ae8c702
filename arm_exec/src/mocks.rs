//! Recording implementations of the equipment traits used in tests.

use comms_if::eqpt::{
    input::JoystickState,
    motor::{ControlMode, Direction, FeedbackDevice, Gain, MotorError, MotorInterface, NeutralMode},
    telem::{ArmReadout, TelemetrySink, TmChannel},
};

// ---------------------------------------------------------------------------
// MOTOR
// ---------------------------------------------------------------------------

/// Every call made on a [`MockMotor`].
#[derive(Debug, Clone, PartialEq)]
pub enum MotorCall {
    FactoryDefault(u32),
    SetSensorPosition(f64, u32),
    NeutralMode(NeutralMode),
    FeedbackSensor(FeedbackDevice, u8, u32),
    SensorPhase(bool),
    Inverted(bool),
    NominalOutput(Direction, f64, u32),
    PeakOutput(Direction, f64, u32),
    AllowableError(u8, f64, u32),
    Gain(u8, Gain, f64, u32),
    Set(ControlMode, f64),
}

/// Motor which records its calls and reports whatever position it is told.
#[derive(Debug, Default)]
pub struct MockMotor {
    pub pos_ticks: f64,
    pub vel: f64,
    pub calls: Vec<MotorCall>,

    /// Names of the methods which should fail.
    pub failing: Vec<&'static str>,
}

impl MockMotor {
    fn record(&mut self, name: &'static str, call: MotorCall) -> Result<(), MotorError> {
        self.calls.push(call);
        if self.failing.contains(&name) {
            Err(MotorError::Timeout(30))
        }
        else {
            Ok(())
        }
    }

    /// The demands issued with `set`, oldest first.
    pub fn demands(&self) -> Vec<(ControlMode, f64)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                MotorCall::Set(m, v) => Some((*m, *v)),
                _ => None,
            })
            .collect()
    }

    /// The configuration calls, everything but `set`.
    pub fn config_calls(&self) -> Vec<MotorCall> {
        self.calls
            .iter()
            .filter(|c| !matches!(c, MotorCall::Set(..)))
            .cloned()
            .collect()
    }
}

impl MotorInterface for MockMotor {
    fn factory_default(&mut self, timeout_ms: u32) -> Result<(), MotorError> {
        self.record("factory_default", MotorCall::FactoryDefault(timeout_ms))
    }

    fn set_sensor_position(&mut self, pos_ticks: f64, timeout_ms: u32) -> Result<(), MotorError> {
        self.record(
            "set_sensor_position",
            MotorCall::SetSensorPosition(pos_ticks, timeout_ms),
        )?;
        self.pos_ticks = pos_ticks;
        Ok(())
    }

    fn set_neutral_mode(&mut self, mode: NeutralMode) -> Result<(), MotorError> {
        self.record("set_neutral_mode", MotorCall::NeutralMode(mode))
    }

    fn config_feedback_sensor(
        &mut self,
        device: FeedbackDevice,
        pid_loop_idx: u8,
        timeout_ms: u32,
    ) -> Result<(), MotorError> {
        self.record(
            "config_feedback_sensor",
            MotorCall::FeedbackSensor(device, pid_loop_idx, timeout_ms),
        )
    }

    fn set_sensor_phase(&mut self, phase: bool) -> Result<(), MotorError> {
        self.record("set_sensor_phase", MotorCall::SensorPhase(phase))
    }

    fn set_inverted(&mut self, inverted: bool) -> Result<(), MotorError> {
        self.record("set_inverted", MotorCall::Inverted(inverted))
    }

    fn config_nominal_output(
        &mut self,
        dir: Direction,
        output: f64,
        timeout_ms: u32,
    ) -> Result<(), MotorError> {
        self.record(
            "config_nominal_output",
            MotorCall::NominalOutput(dir, output, timeout_ms),
        )
    }

    fn config_peak_output(
        &mut self,
        dir: Direction,
        output: f64,
        timeout_ms: u32,
    ) -> Result<(), MotorError> {
        self.record(
            "config_peak_output",
            MotorCall::PeakOutput(dir, output, timeout_ms),
        )
    }

    fn config_allowable_error(
        &mut self,
        slot_idx: u8,
        error_ticks: f64,
        timeout_ms: u32,
    ) -> Result<(), MotorError> {
        self.record(
            "config_allowable_error",
            MotorCall::AllowableError(slot_idx, error_ticks, timeout_ms),
        )
    }

    fn config_gain(
        &mut self,
        slot_idx: u8,
        gain: Gain,
        value: f64,
        timeout_ms: u32,
    ) -> Result<(), MotorError> {
        self.record(
            "config_gain",
            MotorCall::Gain(slot_idx, gain, value, timeout_ms),
        )
    }

    fn set(&mut self, mode: ControlMode, value: f64) -> Result<(), MotorError> {
        self.record("set", MotorCall::Set(mode, value))
    }

    fn sensor_position(&self) -> f64 {
        self.pos_ticks
    }

    fn sensor_velocity(&self) -> f64 {
        self.vel
    }
}

// ---------------------------------------------------------------------------
// TELEMETRY
// ---------------------------------------------------------------------------

/// Sink which keeps every refresh it is given.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub channels: Vec<TmChannel>,
    pub refreshes: Vec<Vec<(TmChannel, f64)>>,
}

impl TelemetrySink for RecordingSink {
    fn add_number(&mut self, channel: TmChannel) {
        self.channels.push(channel);
    }

    fn refresh(&mut self, source: &dyn ArmReadout) {
        let values = self
            .channels
            .iter()
            .map(|c| (*c, source.read(*c)))
            .collect();
        self.refreshes.push(values);
    }
}

// ---------------------------------------------------------------------------
// INPUT
// ---------------------------------------------------------------------------

/// Joystick with the manual button (1) set and the arm axis (1) deflected so
/// that, after the usual axis inversion, the arm sees `axis_value`.
pub fn stick(manual: bool, axis_value: f64) -> JoystickState {
    let mut js = JoystickState::new(2, 12);
    js.set_button(1, manual);
    js.set_axis(1, -axis_value);
    js
}
