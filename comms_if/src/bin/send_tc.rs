//! Sends a telecommand to the sim.
//!
//! The TC is read as JSON from a file, for example a planning trajectory dumped from a log. The
//! sim connects to the command endpoint, so this tool binds it.

use std::{path::PathBuf, thread, time::Duration};

use comms_if::{
    net::{zmq, MonitoredSocket, SocketOptions},
    tc::Tc,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "send_tc", about = "Send a telecommand to the sim")]
struct Opts {
    /// Path to a JSON file containing the TC
    #[structopt(parse(from_os_str))]
    tc_path: PathBuf,

    /// Endpoint to bind the command socket to
    #[structopt(short, long, default_value = "tcp://*:5020")]
    endpoint: String,

    /// Number of times to send the TC
    #[structopt(short, long, default_value = "1")]
    repeat: u32,

    /// Time between repeats in milliseconds
    #[structopt(short, long, default_value = "100")]
    interval_ms: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::from_args();

    let tc = Tc::from_json(&std::fs::read_to_string(&opts.tc_path)?)?;
    let tc_str = tc.to_json()?;

    let ctx = zmq::Context::new();
    let socket = MonitoredSocket::new(&ctx, zmq::PUB, SocketOptions::publisher(), &opts.endpoint)?;

    // Give the sim a chance to connect before publishing
    thread::sleep(Duration::from_millis(500));

    for i in 0..opts.repeat {
        socket.send(tc_str.as_str(), 0)?;
        println!("Sent {} TC ({}/{})", tc.name(), i + 1, opts.repeat);
        thread::sleep(Duration::from_millis(opts.interval_ms));
    }

    Ok(())
}
