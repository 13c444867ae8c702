//! Main arm executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Telecommand processing and handling
//!         - Command bindings
//!         - Arm control processing, which drives the motor and refreshes
//!           the telemetry
//!         - Cycle management
//!
//! # Modules
//!
//! All modules (e.g. `arm_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use arm_lib::{
    arm_ctrl::ArmCtrl,
    bindings::Bindings,
    data_store::DataStore,
    dry_run::DryRunMotor,
    params::ArmExecParams,
    tc_processor,
    tm_server::TmServer,
    CYCLE_FREQUENCY_HZ, CYCLE_PERIOD_S,
};
use comms_if::tc::TcResponse;
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of consecutive overruns after which a summary warning is raised.
const OVERRUN_WARNING_LIMIT: u64 = 50;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "arm_exec", about = "Single joint arm control executable")]
struct Opts {
    /// TC script to execute. Without one the arm holds its position until the
    /// process is killed.
    #[structopt(parse(from_os_str))]
    script: Option<PathBuf>,

    /// Minimum log level, one of info, debug or trace
    #[structopt(short, long, default_value = "debug")]
    log_level: LevelFilter,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opts.log_level, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Arm Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let exec_params: ArmExecParams = util::params::load("arm_exec.toml")
        .wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");
    session.save("arm_exec_params.json", exec_params.clone());

    // ---- INITIALISE TC SOURCE ----

    let mut script = match opts.script {
        Some(ref path) => {
            info!("Loading script from {:?}", path);

            let si = ScriptInterpreter::new(path).wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} TCs\n",
                si.get_duration(),
                si.get_num_tcs()
            );

            Some(si)
        }
        None => {
            info!("No script provided, holding position until killed\n");
            None
        }
    };

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let tm_server = TmServer::new(&zmq_ctx, &exec_params.tm_endpoint)
        .wrap_err("Failed to initialise TmServer")?;
    info!("TmServer publishing on {}", exec_params.tm_endpoint);

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    info!(
        "Arm motor is CAN ID {}, operator joystick on port {}",
        exec_params.arm_motor_can_id, exec_params.oper_joystick_port
    );
    let motor = DryRunMotor::new(exec_params.arm_motor_can_id);

    let mut arm_ctrl = ArmCtrl::new(motor, tm_server);
    arm_ctrl
        .init("arm_ctrl.toml", &session)
        .wrap_err("Failed to initialise ArmCtrl")?;
    session.save("arm_ctrl/params.json", arm_ctrl.params().clone());
    info!("ArmCtrl init complete");

    let mut ds = DataStore::new(arm_ctrl, Bindings::new(exec_params.bindings));

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- TELECOMMAND PROCESSING ----

        if let Some(ref mut si) = script {
            match si.get_pending_tcs() {
                PendingTcs::None => (),
                PendingTcs::Some(tc_vec) => {
                    for tc in tc_vec.iter() {
                        debug!("Executing scripted TC: {:?}", tc);
                        if let TcResponse::CannotExecute = tc_processor::exec(&mut ds, tc) {
                            warn!("Scripted TC {:?} cannot be executed in the current mode", tc);
                        }
                    }
                }
                // Exit if end of script reached
                PendingTcs::EndOfScript => {
                    info!("End of TC script reached, stopping");
                    break;
                }
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        ds.prepare_arm_ctrl_input();
        ds.proc_arm_ctrl();

        if ds.is_1_hz_cycle {
            info!(
                "Arm at {:.1} ticks, target {:.1} ticks, dashboard {}{}",
                ds.arm_ctrl_status_rpt.pos_ticks,
                ds.arm_ctrl_status_rpt.target_pos_ticks,
                if ds.arm_ctrl.tm_sink().connected() { "connected" } else { "not connected" },
                if ds.safe { " (SAFE)" } else { "" }
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;

                if ds.num_consec_cycle_overruns == OVERRUN_WARNING_LIMIT {
                    warn!(
                        "{} consecutive cycle overruns, the arm is not being updated at the \
                        expected rate",
                        OVERRUN_WARNING_LIMIT
                    );
                }
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    ds.arm_ctrl.make_safe();
    session.save("arm_ctrl/final_status_report.json", ds.arm_ctrl_status_rpt);

    info!("End of execution");

    session.exit();

    Ok(())
}
