//! Prints the telemetry published by the sim.

use comms_if::{
    msg::{chassis::Chassis, localization::LocalizationEstimate},
    net::{zmq, MonitoredSocket, SocketOptions, SIM_TM_TOPIC},
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "tm_listen", about = "Print the sim's telemetry")]
struct Opts {
    /// Endpoint the sim publishes telemetry on
    #[structopt(short, long, default_value = "tcp://localhost:5021")]
    endpoint: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::from_args();

    let ctx = zmq::Context::new();
    let socket = MonitoredSocket::new(
        &ctx,
        zmq::SUB,
        SocketOptions {
            recv_timeout: -1,
            ..SocketOptions::subscriber()
        },
        &opts.endpoint,
    )?;
    socket.set_subscribe(SIM_TM_TOPIC.as_bytes())?;

    loop {
        let parts = socket.recv_multipart(0)?;
        if parts.len() != 3 {
            println!("Expected 3 frames, got {}", parts.len());
            continue;
        }

        let chassis: Chassis = serde_json::from_slice(&parts[1])?;
        let loc: LocalizationEstimate = serde_json::from_slice(&parts[2])?;

        println!(
            "[{:.3}] #{} {:?} {:?} v={:.3} m/s thr={:.1}% brk={:.1}% | x={:.3} y={:.3} hdg={:.3}",
            loc.header.timestamp_sec,
            loc.header.sequence_num,
            chassis.driving_mode,
            chassis.gear_location,
            chassis.speed_mps,
            chassis.throttle_percentage,
            chassis.brake_percentage,
            loc.pose.position.x,
            loc.pose.position.y,
            loc.pose.heading
        );
    }
}
