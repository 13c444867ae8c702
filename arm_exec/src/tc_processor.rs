//! # Telecommand processor module
//!
//! The telecommand processor handles TCs coming from any source.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use comms_if::{
    eqpt::{motor::MotorInterface, telem::TelemetrySink},
    tc::{Tc, TcResponse},
};
use crate::data_store::{DataStore, SafeModeCause};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules. While in safe mode only
/// `MakeUnsafe` is executed, joystick snapshots are still stored but are not acted on until safe
/// mode ends.
pub fn exec<M, S>(ds: &mut DataStore<M, S>, tc: &Tc) -> TcResponse
where
    M: MotorInterface,
    S: TelemetrySink,
{
    match tc {
        Tc::MakeSafe if ds.safe => TcResponse::CannotExecute,
        Tc::MakeSafe => {
            debug!("Recieved MakeSafe command");
            ds.make_safe(SafeModeCause::MakeSafeTc);
            TcResponse::Ok
        }
        Tc::MakeUnsafe => {
            debug!("Recieved MakeUnsafe command");
            match ds.make_unsafe(SafeModeCause::MakeSafeTc) {
                Ok(()) => TcResponse::Ok,
                Err(()) => {
                    warn!("Safe mode was not caused by a MakeSafe TC, it cannot be cleared by one");
                    TcResponse::CannotExecute
                }
            }
        }
        Tc::Joystick(js) => {
            ds.joystick = js.clone();
            TcResponse::Ok
        }
        Tc::ArmCtrl(_) if ds.safe => TcResponse::CannotExecute,
        Tc::ArmCtrl(cmd) => {
            if let Some(prev) = ds.arm_ctrl_input.cmd.replace(*cmd) {
                warn!("ArmCtrl command {:?} replaced by {:?} in the same cycle", prev, cmd);
            }
            TcResponse::Ok
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        arm_ctrl::{ArmCtrl, Params},
        bindings::{BindingParams, Bindings},
        mocks::{stick, MockMotor, RecordingSink},
    };
    use comms_if::tc::arm_ctrl::{ArmCmd, Preset};

    fn data_store() -> DataStore<MockMotor, RecordingSink> {
        let mut arm_ctrl = ArmCtrl::with_params(
            MockMotor::default(),
            RecordingSink::default(),
            Params::default(),
        );
        arm_ctrl.configure().unwrap();

        DataStore::new(arm_ctrl, Bindings::new(BindingParams::default()))
    }

    const TOP: Tc = Tc::ArmCtrl(ArmCmd::MoveToPreset { preset: Preset::Top });

    #[test]
    fn test_arm_cmd() {
        let mut ds = data_store();

        assert_eq!(exec(&mut ds, &TOP), TcResponse::Ok);
        assert_eq!(
            ds.arm_ctrl_input.cmd,
            Some(ArmCmd::MoveToPreset { preset: Preset::Top })
        );

        // Last one wins
        assert_eq!(exec(&mut ds, &Tc::ArmCtrl(ArmCmd::Stop)), TcResponse::Ok);
        assert_eq!(ds.arm_ctrl_input.cmd, Some(ArmCmd::Stop));
    }

    #[test]
    fn test_safe_mode_rejects() {
        let mut ds = data_store();

        assert_eq!(exec(&mut ds, &Tc::MakeSafe), TcResponse::Ok);
        assert!(ds.safe);

        assert_eq!(exec(&mut ds, &TOP), TcResponse::CannotExecute);
        assert_eq!(exec(&mut ds, &Tc::MakeSafe), TcResponse::CannotExecute);
        assert_eq!(ds.arm_ctrl_input.cmd, None);

        // Joystick is stored but not used while safe
        assert_eq!(exec(&mut ds, &Tc::Joystick(stick(true, 0.5))), TcResponse::Ok);
        assert_eq!(ds.joystick, stick(true, 0.5));

        assert_eq!(exec(&mut ds, &Tc::MakeUnsafe), TcResponse::Ok);
        assert!(!ds.safe);
        assert_eq!(exec(&mut ds, &TOP), TcResponse::Ok);
    }

    #[test]
    fn test_make_unsafe_wrong_cause() {
        let mut ds = data_store();

        ds.make_safe(SafeModeCause::ArmCtrlFault);

        assert_eq!(exec(&mut ds, &Tc::MakeUnsafe), TcResponse::CannotExecute);
        assert!(ds.safe);
    }
}
