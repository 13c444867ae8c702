//! # TM Server
//!
//! Publishes the arm's dashboard channels as JSON over a ZMQ PUB socket, one packet per refresh.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use comms_if::{
    eqpt::telem::{ArmReadout, TelemetrySink, TmChannel},
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
};
use util::session::get_elapsed_seconds;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry server
pub struct TmServer {
    socket: MonitoredSocket,

    /// Registered channels, in registration order.
    channels: Vec<TmChannel>,

    /// Set once a send failure has been reported, so the log isn't flooded at the cycle rate.
    send_error_reported: bool,
}

/// Telemetry packet that is output by the server.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TmPacket {
    pub time_s: f64,

    /// Channel values keyed by their display label.
    pub values: BTreeMap<String, f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TmServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send telemetry: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the telemetry: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TmServer {
    /// Create a new instance of the TM Server bound to `endpoint`.
    ///
    /// This function will not block until a client connects.
    pub fn new(ctx: &zmq::Context, endpoint: &str) -> Result<Self, TmServerError> {
        let socket_options = SocketOptions {
            bind: true,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options, endpoint)
            .map_err(TmServerError::SocketError)?;

        Ok(Self {
            socket,
            channels: Vec::new(),
            send_error_reported: false,
        })
    }

    /// True if at least one dashboard is subscribed.
    pub fn connected(&self) -> bool {
        self.socket.connected()
    }

    pub fn send(&self, packet: &TmPacket) -> Result<(), TmServerError> {
        let packet_string = serde_json::to_string(packet)
            .map_err(TmServerError::SerializationError)?;

        self.socket
            .send(packet_string.as_str(), 0)
            .map_err(TmServerError::SendError)
    }
}

impl TelemetrySink for TmServer {
    fn add_number(&mut self, channel: TmChannel) {
        if !self.channels.contains(&channel) {
            self.channels.push(channel);
        }
    }

    fn refresh(&mut self, source: &dyn ArmReadout) {
        let packet = TmPacket::build(get_elapsed_seconds(), &self.channels, source);

        match self.send(&packet) {
            Ok(()) => self.send_error_reported = false,
            Err(e) => {
                if !self.send_error_reported {
                    warn!("TmServer error: {}", e);
                    self.send_error_reported = true;
                }
            }
        }
    }
}

impl TmPacket {
    /// Read every channel in `channels` from `source`.
    pub fn build(time_s: f64, channels: &[TmChannel], source: &dyn ArmReadout) -> Self {
        Self {
            time_s,
            values: channels
                .iter()
                .map(|c| (String::from(c.label()), source.read(*c)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::telem::ARM_TM_CHANNELS;

    struct Readout;

    impl ArmReadout for Readout {
        fn position(&self) -> f64 {
            100.0
        }
        fn velocity(&self) -> f64 {
            2.5
        }
        fn target_position(&self) -> f64 {
            150.0
        }
    }

    #[test]
    fn test_build_packet() {
        let packet = TmPacket::build(1.5, &ARM_TM_CHANNELS, &Readout);

        assert_eq!(packet.time_s, 1.5);
        assert_eq!(packet.values.len(), 4);
        assert_eq!(packet.values["Arm Position"], 100.0);
        assert_eq!(packet.values["Arm Velocity"], 2.5);
        assert_eq!(packet.values["Arm Target Position"], 150.0);
        assert_eq!(packet.values["Arm Tracking Error"], 50.0);
    }

    #[test]
    fn test_only_registered_channels() {
        let packet = TmPacket::build(0.0, &[TmChannel::TrackingError], &Readout);

        let json = serde_json::to_string(&packet).unwrap();
        assert_eq!(json, r#"{"time_s":0.0,"values":{"Arm Tracking Error":50.0}}"#);
    }

    fn wait_for(server: &TmServer, connected: bool) -> bool {
        for _ in 0..200 {
            if server.connected() == connected {
                return true;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn test_connected_tracks_dashboard() {
        let ctx = zmq::Context::new();
        let server = TmServer::new(&ctx, "tcp://127.0.0.1:5931").unwrap();
        assert!(!server.connected());

        let dashboard = ctx.socket(zmq::SUB).unwrap();
        dashboard.connect("tcp://127.0.0.1:5931").unwrap();
        assert!(wait_for(&server, true));

        drop(dashboard);
        assert!(wait_for(&server, false));
    }
}
