//! # Network Module
//!
//! ZMQ is used to get telemetry off the robot and onto the dashboard. This module wraps a zmq
//! socket with a monitor so the owner can tell whether anyone is actually listening.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    thread,
};
use log::warn;
use zmq::{Context, Socket, SocketEvent, SocketType};

// Export zmq
pub use zmq;

// ------------------------------------------------------------------------------------------------
// MACROS
// ------------------------------------------------------------------------------------------------

macro_rules! set_sockopts {
    ($socket:expr, $(($opt:ident, $val:expr)),+) => {
        $(
            $socket.$opt($val)
                .map_err(|e| MonitoredSocketError::SocketOptionError(stringify!($opt).into(), e))?;
        )+
    };
}

// ------------------------------------------------------------------------------------------------
// STATICS
// ------------------------------------------------------------------------------------------------

/// Number of monitors created so far, gives each monitor endpoint a unique name.
static NUM_MONITORS: AtomicUsize = AtomicUsize::new(0);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A zmq socket whose connection state is tracked by a background monitor thread.
pub struct MonitoredSocket {
    socket: Socket,

    shutdown: Arc<AtomicBool>,

    /// Number of peers currently connected, kept by the monitor thread.
    peers: Arc<AtomicUsize>,
}

/// Options applied to a [`MonitoredSocket`].
///
/// The zmq options follow the
/// [`zmq_setsockopt`](http://api.zeromq.org/4-2:zmq-setsockopt) documentation.
pub struct SocketOptions {
    /// Bind to the endpoint (servers) instead of connecting to it (clients).
    ///
    /// The default value is `false`.
    pub bind: bool,

    /// `ZMQ_LINGER`: Set linger period for socket shutdown
    pub linger: i32,

    /// `ZMQ_RECONNECT_IVL`: Set reconnection interval
    pub reconnect_ivl: i32,

    /// `ZMQ_CONNECT_TIMEOUT`: Set `connect()` timeout
    pub connect_timeout: i32,

    /// `ZMQ_SNDTIMEO`: Maximum time before a send operation returns with `EAGAIN`
    pub send_timeout: i32,

    /// `ZMQ_HEARTBEAT_IVL`: Set interval between sending ZMTP heartbeats
    pub heartbeat_ivl: i32,

    /// `ZMQ_HEARTBEAT_TIMEOUT`: Set timeout for ZMTP heartbeats
    pub heartbeat_timeout: i32,

    /// `ZMQ_HEARTBEAT_TTL`: Set the TTL (time to live) value for ZMTP heartbeats
    pub heartbeat_ttl: i32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum MonitoredSocketError {
    #[error("Error creating the socket: {0}")]
    CreateSocketError(zmq::Error),

    #[error("Error enabling monitoring for the socket: {0}")]
    MonitoringEnableError(zmq::Error),

    #[error("Could not connect the socket: {0}")]
    CouldNotConnect(zmq::Error),

    #[error("Could not set the {0} socket option: {1}")]
    SocketOptionError(String, zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MonitoredSocket {
    /// Create a new monitored socket.
    ///
    /// This function never waits for a peer to connect, use [`MonitoredSocket::connected`] to
    /// check for one.
    ///
    /// ## Arguments
    /// - `ctx`: the zmq context which will be used to create the socket
    /// - `socket_type`: the type of zmq socket to create
    /// - `socket_options`: a [`SocketOptions`] struct specifying how to configure the socket
    /// - `endpoint`: a zmq endpoint string, such as `"tcp://*:5030"`
    pub fn new(
        ctx: &Context,
        socket_type: SocketType,
        socket_options: SocketOptions,
        endpoint: &str,
    ) -> Result<Self, MonitoredSocketError> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let peers = Arc::new(AtomicUsize::new(0));

        let socket = ctx
            .socket(socket_type)
            .map_err(MonitoredSocketError::CreateSocketError)?;

        // Enable, create, and connect the monitor
        let monitor_endpoint = format!(
            "inproc://monitor_{}",
            NUM_MONITORS.fetch_add(1, Ordering::Relaxed)
        );
        socket
            .monitor(&monitor_endpoint, SocketEvent::ALL as i32)
            .map_err(MonitoredSocketError::MonitoringEnableError)?;
        let monitor = ctx
            .socket(zmq::PAIR)
            .map_err(MonitoredSocketError::CreateSocketError)?;
        monitor
            .connect(&monitor_endpoint)
            .map_err(MonitoredSocketError::CouldNotConnect)?;

        socket_options.set(&socket)?;

        match socket_options.bind {
            false => socket.connect(endpoint),
            true => socket.bind(endpoint),
        }
        .map_err(MonitoredSocketError::CouldNotConnect)?;

        let shutdown_clone = shutdown.clone();
        let peers_clone = peers.clone();
        thread::spawn(move || monitor_socket(monitor, monitor_endpoint, shutdown_clone, peers_clone));

        Ok(Self {
            socket,
            shutdown,
            peers,
        })
    }

    /// Return if at least one peer is connected to the socket.
    pub fn connected(&self) -> bool {
        self.peers.load(Ordering::Relaxed) > 0
    }
}

impl Drop for MonitoredSocket {
    fn drop(&mut self) {
        // The monitor thread exits on its next event, it is not joined as it may be blocked
        // waiting for one.
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl std::ops::Deref for MonitoredSocket {
    type Target = Socket;

    fn deref(&self) -> &Self::Target {
        &self.socket
    }
}

impl SocketOptions {
    /// Set these options on the given socket.
    pub fn set(&self, socket: &Socket) -> Result<(), MonitoredSocketError> {
        set_sockopts!(
            socket,
            (set_connect_timeout, self.connect_timeout),
            (set_heartbeat_ivl, self.heartbeat_ivl),
            (set_heartbeat_timeout, self.heartbeat_timeout),
            (set_heartbeat_ttl, self.heartbeat_ttl),
            (set_linger, self.linger),
            (set_reconnect_ivl, self.reconnect_ivl),
            (set_sndtimeo, self.send_timeout)
        );

        Ok(())
    }
}

impl Default for SocketOptions {
    fn default() -> Self {
        // Defaults taken from http://api.zeromq.org/4-2:zmq-setsockopt
        Self {
            bind: false,
            connect_timeout: 0,
            heartbeat_ivl: 0,
            heartbeat_timeout: 0,
            heartbeat_ttl: 0,
            linger: 30_000,
            reconnect_ivl: 100,
            send_timeout: -1,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Read an event from a monitor socket.
///
/// Returns `None` if the event frame is too short to hold an event ID.
fn read_event(socket: &Socket) -> Result<Option<SocketEvent>, zmq::Error> {
    let msg = socket.recv_msg(0)?;

    // Event messages are a 2 byte event ID and a 4 byte value, followed by a second frame with the
    // address, which is ignored.
    let event = parse_event_id(&msg);
    if socket.get_rcvmore()? {
        socket.recv_msg(0)?;
    }

    Ok(event.map(SocketEvent::from_raw))
}

/// Get the event ID from the first frame of a monitor message.
fn parse_event_id(frame: &[u8]) -> Option<u16> {
    frame.get(..2).map(|id| u16::from_ne_bytes([id[0], id[1]]))
}

/// Update the peer count for a monitor event, returning the new count.
///
/// A disconnect with no peers recorded leaves the count at zero.
fn update_peers(peers: &AtomicUsize, event: SocketEvent) -> usize {
    match event {
        SocketEvent::ACCEPTED | SocketEvent::CONNECTED => {
            peers.fetch_add(1, Ordering::Relaxed) + 1
        }
        SocketEvent::DISCONNECTED => {
            let prev = peers
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| Some(n.saturating_sub(1)))
                .unwrap_or(0);
            prev.saturating_sub(1)
        }
        _ => peers.load(Ordering::Relaxed),
    }
}

fn monitor_socket(
    monitor: Socket,
    monitor_endpoint: String,
    shutdown: Arc<AtomicBool>,
    peers: Arc<AtomicUsize>,
) {
    while !shutdown.load(Ordering::Relaxed) {
        match read_event(&monitor) {
            Ok(Some(event)) => {
                update_peers(&peers, event);
            }
            Ok(None) => warn!("Malformed event on monitor {}, ignoring it", monitor_endpoint),
            Err(e) => {
                warn!("Error reading event from monitor {}: {}", monitor_endpoint, e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_event_id() {
        let accepted = (SocketEvent::ACCEPTED as u16).to_ne_bytes();
        let frame = [accepted[0], accepted[1], 0, 0, 0, 0];

        assert_eq!(parse_event_id(&frame), Some(SocketEvent::ACCEPTED as u16));
        assert_eq!(parse_event_id(&frame[..2]), Some(SocketEvent::ACCEPTED as u16));
        assert_eq!(parse_event_id(&frame[..1]), None);
        assert_eq!(parse_event_id(&[]), None);
    }

    #[test]
    fn test_peer_count() {
        let peers = AtomicUsize::new(0);

        // Two dashboards subscribe, one leaves
        assert_eq!(update_peers(&peers, SocketEvent::ACCEPTED), 1);
        assert_eq!(update_peers(&peers, SocketEvent::ACCEPTED), 2);
        assert_eq!(update_peers(&peers, SocketEvent::DISCONNECTED), 1);

        // Other events leave the count alone
        assert_eq!(update_peers(&peers, SocketEvent::CLOSED), 1);

        assert_eq!(update_peers(&peers, SocketEvent::DISCONNECTED), 0);
        assert_eq!(update_peers(&peers, SocketEvent::DISCONNECTED), 0);
        assert_eq!(peers.load(Ordering::Relaxed), 0);
    }
}
