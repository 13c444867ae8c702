//! # Telemetry Interface
//!
//! Telemetry is pull based: a sink is told which channels to display once, and then reads their
//! values from an [`ArmReadout`] whenever it refreshes.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// All channels the arm publishes, in display order.
pub const ARM_TM_CHANNELS: [TmChannel; 4] = [
    TmChannel::Position,
    TmChannel::Velocity,
    TmChannel::TargetPosition,
    TmChannel::TrackingError,
];

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Read access to the quantities displayed on the dashboard.
pub trait ArmReadout {
    /// Measured arm position.
    ///
    /// Units: sensor ticks
    fn position(&self) -> f64;

    /// Measured arm velocity.
    ///
    /// Units: sensor ticks per 100 ms
    fn velocity(&self) -> f64;

    /// The setpoint the arm is being driven to.
    ///
    /// Units: sensor ticks
    fn target_position(&self) -> f64;

    /// Setpoint minus measured position.
    ///
    /// Units: sensor ticks
    fn tracking_error(&self) -> f64 {
        self.target_position() - self.position()
    }

    /// Read the value of a channel.
    fn read(&self, channel: TmChannel) -> f64 {
        match channel {
            TmChannel::Position => self.position(),
            TmChannel::Velocity => self.velocity(),
            TmChannel::TargetPosition => self.target_position(),
            TmChannel::TrackingError => self.tracking_error(),
        }
    }
}

/// A display sink for named numeric values, such as a dashboard.
pub trait TelemetrySink {
    /// Register a channel to be displayed.
    fn add_number(&mut self, channel: TmChannel);

    /// Pull the values of every registered channel from `source`.
    fn refresh(&mut self, source: &dyn ArmReadout);
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Numeric channels shown on the dashboard.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TmChannel {
    Position,
    Velocity,
    TargetPosition,
    TrackingError,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TmChannel {
    /// Display label of the channel.
    pub fn label(&self) -> &'static str {
        match self {
            TmChannel::Position => "Arm Position",
            TmChannel::Velocity => "Arm Velocity",
            TmChannel::TargetPosition => "Arm Target Position",
            TmChannel::TrackingError => "Arm Tracking Error",
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Fixed;

    impl ArmReadout for Fixed {
        fn position(&self) -> f64 {
            9000.0
        }
        fn velocity(&self) -> f64 {
            -12.0
        }
        fn target_position(&self) -> f64 {
            10000.0
        }
    }

    #[test]
    fn test_read_channels() {
        assert_eq!(Fixed.read(TmChannel::Position), 9000.0);
        assert_eq!(Fixed.read(TmChannel::Velocity), -12.0);
        assert_eq!(Fixed.read(TmChannel::TargetPosition), 10000.0);
        assert_eq!(Fixed.read(TmChannel::TrackingError), 1000.0);
    }
}
