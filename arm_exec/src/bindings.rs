//! # Command bindings
//!
//! Maps joystick buttons onto arm commands. A command is produced when a button goes from
//! released to pressed, holding the button does nothing further.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use serde::{Deserialize, Serialize};

use comms_if::{
    eqpt::input::InputSource,
    tc::arm_ctrl::{ArmCmd, Preset},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Presets in priority order, the first one pressed wins.
const PRESET_PRIORITY: [Preset; 3] = [Preset::Bottom, Preset::Middle, Preset::Top];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Buttons bound to the preset positions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BindingParams {
    pub bottom_pos_button: u8,
    pub middle_pos_button: u8,
    pub top_pos_button: u8,
}

/// Rising edge detector for the preset buttons.
#[derive(Debug, Clone)]
pub struct Bindings {
    params: BindingParams,

    /// Button states on the previous poll, in `PRESET_PRIORITY` order.
    prev_pressed: [bool; 3],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for BindingParams {
    fn default() -> Self {
        Self {
            bottom_pos_button: 12,
            middle_pos_button: 10,
            top_pos_button: 8,
        }
    }
}

impl Bindings {
    pub fn new(params: BindingParams) -> Self {
        Self {
            params,
            prev_pressed: [false; 3],
        }
    }

    /// Poll the buttons, returning the command for any newly pressed preset.
    pub fn poll<I: InputSource>(&mut self, input: &I) -> Option<ArmCmd> {
        let mut cmd = None;

        for (i, preset) in PRESET_PRIORITY.iter().enumerate() {
            let pressed = input.button(self.button(*preset));

            if pressed && !self.prev_pressed[i] && cmd.is_none() {
                debug!("{} preset button pressed", preset);
                cmd = Some(ArmCmd::MoveToPreset { preset: *preset });
            }

            self.prev_pressed[i] = pressed;
        }

        cmd
    }

    fn button(&self, preset: Preset) -> u8 {
        match preset {
            Preset::Bottom => self.params.bottom_pos_button,
            Preset::Middle => self.params.middle_pos_button,
            Preset::Top => self.params.top_pos_button,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::input::JoystickState;

    fn pressed(buttons: &[u8]) -> JoystickState {
        let mut js = JoystickState::new(2, 12);
        for b in buttons {
            js.set_button(*b, true);
        }
        js
    }

    fn preset(p: Preset) -> Option<ArmCmd> {
        Some(ArmCmd::MoveToPreset { preset: p })
    }

    #[test]
    fn test_rising_edge_only() {
        let mut b = Bindings::new(BindingParams::default());

        assert_eq!(b.poll(&pressed(&[])), None);
        assert_eq!(b.poll(&pressed(&[8])), preset(Preset::Top));
        assert_eq!(b.poll(&pressed(&[8])), None);
        assert_eq!(b.poll(&pressed(&[8])), None);
        assert_eq!(b.poll(&pressed(&[])), None);
        assert_eq!(b.poll(&pressed(&[8])), preset(Preset::Top));
    }

    #[test]
    fn test_priority() {
        let mut b = Bindings::new(BindingParams::default());

        assert_eq!(b.poll(&pressed(&[8, 10, 12])), preset(Preset::Bottom));

        // The others were also seen as pressed, so releasing bottom alone
        // gives nothing
        assert_eq!(b.poll(&pressed(&[8, 10])), None);

        let mut b = Bindings::new(BindingParams::default());
        assert_eq!(b.poll(&pressed(&[8, 10])), preset(Preset::Middle));
    }

    #[test]
    fn test_held_then_new_button() {
        let mut b = Bindings::new(BindingParams::default());

        assert_eq!(b.poll(&pressed(&[10])), preset(Preset::Middle));
        assert_eq!(b.poll(&pressed(&[10, 12])), preset(Preset::Bottom));
        assert_eq!(b.poll(&pressed(&[10, 12])), None);
    }
}
