//! Implementations for the ArmCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, error, info, trace, warn};
use serde::Serialize;

// Internal
use super::{ArmCtrlError, ConfigStep, IdleBehaviour, Params, PresetStrategy};
use crate::CYCLE_PERIOD_S;
use comms_if::{
    eqpt::{
        input::InputSource,
        motor::{ControlMode, MotorInterface},
        telem::{ArmReadout, TelemetrySink, ARM_TM_CHANNELS},
    },
    tc::arm_ctrl::{ArmCmd, Preset},
};
use util::{
    archive::Archiver,
    maths::{clamp, cycles_in},
    module::State,
    params,
    session::{get_elapsed_seconds, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arm control module state
pub struct ArmCtrl<M, S> {
    pub(crate) params: Params,

    motor: M,

    tm_sink: S,

    configured: bool,

    /// Where the arm should be. Always inside the travel limits once
    /// configured.
    ///
    /// Units: sensor ticks
    target_pos_ticks: f64,

    active_move: Option<TimedMove>,

    pub(crate) report: StatusReport,
    arch_report: Option<Archiver>,
}

/// Input data to Arm Control.
#[derive(Default, Debug, Clone)]
pub struct InputData {
    /// The command to be executed, or `None` if there is no new command on
    /// this cycle.
    pub cmd: Option<ArmCmd>,

    /// The operator's joystick.
    pub joystick: comms_if::eqpt::input::JoystickState,
}

/// The demand issued to the motor on one cycle.
#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
pub struct DriveDemand {
    pub mode: ControlMode,

    /// Sensor ticks in `Position` mode, fraction of full output in
    /// `PercentOutput` mode.
    pub value: f64,
}

/// A move which overrides the idle cycle for a fixed number of cycles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedMove {
    pub kind: MoveKind,

    /// Demand value issued every cycle of the move.
    pub value: f64,

    pub cycles_remaining: u64,
}

/// The kinds of timed moves.
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
pub enum MoveKind {
    /// Closed loop drive to a preset.
    Position,

    /// Open loop drive at a fixed output.
    PercentOutput,
}

/// Status report for ArmCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Session time at which the report was made.
    pub time_s: f64,

    pub pos_ticks: f64,

    /// Units: sensor ticks per 100 ms
    pub vel_ticks_per_100ms: f64,

    pub target_pos_ticks: f64,

    pub tracking_error_ticks: f64,

    /// The timed move running this cycle, if any.
    pub active_move: Option<MoveKind>,

    /// The manual control button was held.
    pub manual_active: bool,

    /// Manual input towards the top was ignored as the arm is at the top.
    pub top_limited: bool,

    /// Manual input towards the bottom was ignored as the arm is at the
    /// bottom.
    pub bottom_limited: bool,

    /// A requested target was outside the travel limits and was clamped.
    pub target_clamped: bool,

    /// The position sensor returned a non-finite value.
    pub sensor_fault: bool,

    /// A timed move finished this cycle.
    pub move_expired: bool,

    /// The command given this cycle could not be executed.
    pub cmd_failed: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<M, S> ArmCtrl<M, S>
where
    M: MotorInterface,
    S: TelemetrySink,
{
    /// Create a new, unconfigured, controller using the default parameters.
    pub fn new(motor: M, tm_sink: S) -> Self {
        Self::with_params(motor, tm_sink, Params::default())
    }

    /// Create a new, unconfigured, controller using the given parameters.
    ///
    /// [`ArmCtrl::configure`] must be called before the first
    /// [`State::proc`].
    pub fn with_params(motor: M, tm_sink: S, params: Params) -> Self {
        Self {
            params,
            motor,
            tm_sink,
            configured: false,
            target_pos_ticks: 0.0,
            active_move: None,
            report: StatusReport::default(),
            arch_report: None,
        }
    }

    /// Configure the motor, register the telemetry channels and start holding
    /// the current position.
    pub fn configure(&mut self) -> Result<(), ArmCtrlError> {
        self.params.validate()?;
        self.configured = false;

        info!("Configuring the arm motor");

        for step in ConfigStep::SEQUENCE.iter() {
            trace!("Applying arm motor configuration step {:?}", step);

            if let Err(e) = step.apply(&mut self.motor, &self.params) {
                if self.params.strict_config {
                    error!("Arm motor configuration step {:?} failed: {}", step, e);
                    return Err(ArmCtrlError::Configuration {
                        step: *step,
                        source: e,
                    });
                }
                warn!(
                    "Arm motor configuration step {:?} failed, continuing: {}",
                    step, e
                );
            }
        }

        for channel in ARM_TM_CHANNELS.iter() {
            self.tm_sink.add_number(*channel);
        }

        let mut pos_ticks = self.motor.sensor_position();
        if !pos_ticks.is_finite() {
            warn!(
                "Arm position sensor read {} during configuration, holding at the bottom",
                pos_ticks
            );
            pos_ticks = self.params.bottom_pos_ticks;
        }
        self.set_target(pos_ticks);

        self.active_move = None;
        self.report = StatusReport::default();
        self.configured = true;

        info!(
            "Arm configured, holding at {:.1} ticks, idle behaviour {:?}, preset strategy {:?}",
            self.target_pos_ticks, self.params.idle_behaviour, self.params.preset_strategy
        );

        Ok(())
    }

    /// The current target position.
    ///
    /// Units: sensor ticks
    pub fn target_pos_ticks(&self) -> f64 {
        self.target_pos_ticks
    }

    /// The timed move currently overriding the idle cycle.
    pub fn active_move(&self) -> Option<TimedMove> {
        self.active_move
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn motor(&self) -> &M {
        &self.motor
    }

    pub fn motor_mut(&mut self) -> &mut M {
        &mut self.motor
    }

    pub fn tm_sink(&self) -> &S {
        &self.tm_sink
    }

    /// Set the target, clamping it to the travel limits.
    fn set_target(&mut self, pos_ticks: f64) {
        let (target, clamped) = clamp(
            pos_ticks,
            self.params.bottom_pos_ticks,
            self.params.top_pos_ticks,
        );

        if clamped {
            trace!("Target {} clamped to {}", pos_ticks, target);
            self.report.target_clamped = true;
        }

        self.target_pos_ticks = target;
    }

    /// Move the target to a preset.
    fn move_to(&mut self, preset: Preset) {
        self.set_target(self.params.preset_pos_ticks(preset));

        self.active_move = match self.params.preset_strategy {
            PresetStrategy::Hold => None,
            PresetStrategy::Timed => Some(TimedMove {
                kind: MoveKind::Position,
                value: self.target_pos_ticks,
                cycles_remaining: cycles_in(self.params.position_move_timeout_s, CYCLE_PERIOD_S),
            }),
        };

        debug!("Moving arm to {} ({:.1} ticks)", preset, self.target_pos_ticks);
    }

    /// Hold the arm where it currently is.
    fn hold_current(&mut self) {
        self.active_move = None;

        let pos_ticks = self.motor.sensor_position();
        if pos_ticks.is_finite() {
            self.set_target(pos_ticks);
        }
        else {
            warn!("Cannot read the arm position, holding the previous target");
        }
    }

    fn exec_cmd(&mut self, cmd: ArmCmd) -> Result<(), ArmCtrlError> {
        debug!("New ArmCtrl command: {:?}", cmd);

        match cmd {
            ArmCmd::MoveToPreset { preset } => self.move_to(preset),
            ArmCmd::SetSpeed { speed } => {
                let (speed, clamped) = clamp(speed, -1.0, 1.0);
                if clamped {
                    warn!("Arm speed demand clamped to {}", speed);
                }

                self.active_move = Some(TimedMove {
                    kind: MoveKind::PercentOutput,
                    value: speed,
                    cycles_remaining: cycles_in(self.params.percent_move_timeout_s, CYCLE_PERIOD_S),
                });
            }
            ArmCmd::Stop => self.hold_current(),
            ArmCmd::ResetPosition => {
                self.motor
                    .set_sensor_position(0.0, self.params.config_timeout_ms)
                    .map_err(ArmCtrlError::Drive)?;
                self.active_move = None;
                self.set_target(0.0);
                info!("Arm position reset to zero");
            }
        }

        Ok(())
    }

    /// Step the active timed move, returning its demand if it is still
    /// running.
    fn step_active_move(&mut self, pos_ticks: f64) -> Option<DriveDemand> {
        let mut mv = self.active_move.take()?;

        let demand = DriveDemand {
            mode: match mv.kind {
                MoveKind::Position => ControlMode::Position,
                MoveKind::PercentOutput => ControlMode::PercentOutput,
            },
            value: mv.value,
        };
        self.report.active_move = Some(mv.kind);

        mv.cycles_remaining = mv.cycles_remaining.saturating_sub(1);

        if mv.cycles_remaining > 0 {
            self.active_move = Some(mv);
        }
        else {
            debug!("Timed {:?} move finished", mv.kind);
            self.report.move_expired = true;

            // After driving open loop the target is stale, pick it up from
            // wherever the arm ended up.
            if mv.kind == MoveKind::PercentOutput && pos_ticks.is_finite() {
                self.set_target(pos_ticks);
            }
        }

        Some(demand)
    }

    /// The behaviour when no timed move is running.
    fn idle_cycle<I: InputSource>(&mut self, input: &I, pos_ticks: f64) -> DriveDemand {
        match self.params.idle_behaviour {
            IdleBehaviour::Track => {
                if pos_ticks.is_finite() {
                    self.integrate_manual(input, pos_ticks);
                }

                DriveDemand {
                    mode: ControlMode::Position,
                    value: self.target_pos_ticks,
                }
            }
            IdleBehaviour::Stop => DriveDemand {
                mode: ControlMode::PercentOutput,
                value: 0.0,
            },
        }
    }

    /// Nudge the target with the joystick while the manual button is held.
    ///
    /// The limit checks use the measured position rather than the target so
    /// that the arm cannot be wound past a limit it has not yet reached.
    fn integrate_manual<I: InputSource>(&mut self, input: &I, pos_ticks: f64) {
        if !input.button(self.params.manual_control_button) {
            return;
        }
        self.report.manual_active = true;

        let raw = input.axis(self.params.arm_axis);
        let axis = if self.params.invert_axis { -raw } else { raw };

        if pos_ticks < self.params.top_pos_ticks && axis > 0.0 {
            self.set_target(self.target_pos_ticks + axis * self.params.speed_multiplier);
        }
        else if pos_ticks > self.params.bottom_pos_ticks && axis < 0.0 {
            self.set_target(self.target_pos_ticks + axis * self.params.speed_multiplier);
        }
        else if axis > 0.0 {
            self.report.top_limited = true;
        }
        else if axis < 0.0 {
            self.report.bottom_limited = true;
        }
    }
}

impl<M, S> State for ArmCtrl<M, S>
where
    M: MotorInterface,
    S: TelemetrySink,
{
    type InitData = &'static str;
    type InitError = ArmCtrlError;

    type InputData = InputData;
    type OutputData = DriveDemand;
    type StatusReport = StatusReport;
    type ProcError = ArmCtrlError;

    /// Initialise the ArmCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        self.params = params::load(init_data)?;

        self.arch_report = match Archiver::from_path(session, "arm_ctrl/status_report.csv") {
            Ok(a) => Some(a),
            Err(e) => {
                warn!("ArmCtrl status reports will not be archived: {}", e);
                None
            }
        };

        self.configure()
    }

    /// Perform cyclic processing of Arm Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        if !self.configured {
            return Err(ArmCtrlError::NotConfigured);
        }

        self.report = StatusReport::default();
        self.report.time_s = get_elapsed_seconds();

        // A failed command must not stop this cycle's demand going out, so
        // its error is only returned once the cycle is complete.
        let cmd_result = match input_data.cmd {
            Some(cmd) => self.exec_cmd(cmd),
            None => Ok(()),
        };
        if let Err(ref e) = cmd_result {
            warn!("ArmCtrl command {:?} failed: {}", input_data.cmd, e);
            self.report.cmd_failed = true;
        }

        let pos_ticks = self.motor.sensor_position();
        if !pos_ticks.is_finite() {
            warn!("Arm position sensor read {}, manual control frozen", pos_ticks);
            self.report.sensor_fault = true;
        }

        let demand = match self.step_active_move(pos_ticks) {
            Some(d) => d,
            None => self.idle_cycle(&input_data.joystick, pos_ticks),
        };

        trace!("Arm demand: {:?} {:.3}", demand.mode, demand.value);

        self.motor
            .set(demand.mode, demand.value)
            .map_err(ArmCtrlError::Drive)?;

        self.report.pos_ticks = pos_ticks;
        self.report.vel_ticks_per_100ms = self.motor.sensor_velocity();
        self.report.target_pos_ticks = self.target_pos_ticks;
        self.report.tracking_error_ticks = self.report.tracking_error();

        self.tm_sink.refresh(&self.report);

        if let Some(ref mut arch) = self.arch_report {
            if let Err(e) = arch.serialise(&self.report) {
                warn!("Could not archive the ArmCtrl status report: {}", e);
            }
        }

        cmd_result?;

        Ok((demand, self.report))
    }

    /// Stop any timed move and hold the arm where it is.
    fn make_safe(&mut self) {
        self.hold_current();
        info!("ArmCtrl made safe, holding at {:.1} ticks", self.target_pos_ticks);
    }
}

impl ArmReadout for StatusReport {
    fn position(&self) -> f64 {
        self.pos_ticks
    }

    fn velocity(&self) -> f64 {
        self.vel_ticks_per_100ms
    }

    fn target_position(&self) -> f64 {
        self.target_pos_ticks
    }
}
