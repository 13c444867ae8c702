//! Telemetry listener, prints every packet published by the arm executable.
//!
//! Usage: `tm_listen [endpoint]`, the endpoint defaults to `tcp://localhost:5030`.

use chrono::Utc;
use comms_if::net::{zmq, MonitoredSocket, SocketOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let endpoint = std::env::args()
        .nth(1)
        .unwrap_or_else(|| String::from("tcp://localhost:5030"));

    let ctx = zmq::Context::new();

    let socket = MonitoredSocket::new(
        &ctx,
        zmq::SUB,
        SocketOptions::default(),
        &endpoint
    )?;

    // Arm telemetry has no topic prefix so subscribe to everything
    socket.set_subscribe(b"")?;

    println!("Listening for arm telemetry on {}", endpoint);

    loop {
        let msg = socket.recv_msg(0)?;

        let recv_time = Utc::now().format("%H:%M:%S%.3f");

        match msg.as_str() {
            Some(s) => println!("[{}] {}", recv_time, s),
            None => println!("[{}] Got non UTF-8 packet ({} bytes)", recv_time, msg.len())
        }
    }
}
