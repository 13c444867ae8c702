//! # Operator Input Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// An input device which is polled once per control cycle.
pub trait InputSource {
    /// Value of an analog axis, between -1 and +1.
    ///
    /// Axes that do not exist read as 0.
    fn axis(&self, channel: u8) -> f64;

    /// State of a button, `true` when pressed.
    ///
    /// Buttons that do not exist read as released.
    fn button(&self, channel: u8) -> bool;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A snapshot of a joystick as reported by the driver station.
///
/// Axes are numbered from 0, buttons are numbered from 1 (button 0 does not exist and is never
/// pressed).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct JoystickState {
    /// Analog axes values.
    #[serde(default)]
    pub axes: Vec<f64>,

    /// Button states, the first element is button 1.
    #[serde(default)]
    pub buttons: Vec<bool>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JoystickState {
    /// Build a snapshot with `num_axes` centred axes and `num_buttons` released buttons.
    pub fn new(num_axes: usize, num_buttons: usize) -> Self {
        Self {
            axes: vec![0.0; num_axes],
            buttons: vec![false; num_buttons],
        }
    }

    /// Set an axis, growing the axis list if needed.
    pub fn set_axis(&mut self, channel: u8, value: f64) {
        let idx = channel as usize;
        if self.axes.len() <= idx {
            self.axes.resize(idx + 1, 0.0);
        }
        self.axes[idx] = value;
    }

    /// Set a button, growing the button list if needed. Button 0 is ignored.
    pub fn set_button(&mut self, channel: u8, pressed: bool) {
        if channel == 0 {
            return;
        }
        let idx = channel as usize - 1;
        if self.buttons.len() <= idx {
            self.buttons.resize(idx + 1, false);
        }
        self.buttons[idx] = pressed;
    }
}

impl InputSource for JoystickState {
    fn axis(&self, channel: u8) -> f64 {
        match self.axes.get(channel as usize) {
            // NaN from a bad packet reads as centred
            Some(v) if v.is_finite() => v.clamp(-1.0, 1.0),
            _ => 0.0,
        }
    }

    fn button(&self, channel: u8) -> bool {
        if channel == 0 {
            return false;
        }
        self.buttons
            .get(channel as usize - 1)
            .copied()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_buttons_are_one_based() {
        let mut js = JoystickState::new(2, 12);
        js.set_button(1, true);
        js.set_button(12, true);

        assert!(js.button(1));
        assert!(js.button(12));
        assert!(!js.button(0));
        assert!(!js.button(2));
        assert!(!js.button(13));
    }

    #[test]
    fn test_axis_clamped_and_missing() {
        let mut js = JoystickState::default();
        js.set_axis(1, 1.7);
        js.set_axis(3, f64::NAN);

        assert_eq!(js.axis(1), 1.0);
        assert_eq!(js.axis(0), 0.0);
        assert_eq!(js.axis(3), 0.0);
        assert_eq!(js.axis(9), 0.0);
    }

    #[test]
    fn test_deserialise_partial() {
        let js: JoystickState = serde_json::from_str(r#"{"axes": [0.0, -0.4]}"#).unwrap();

        assert_eq!(js.axis(1), -0.4);
        assert!(!js.button(1));
    }
}
