//! Send a file through the ICMP covert channel
//!
//! Reads the input file, announces its (encoded) size and sends it as a run
//! of echo requests to the receiver.
//!
//! To run this example:
//!
//! ```sh
//! cargo run --example sender -- <inputfile> <receiver> [--delay-ms N] [--id N] [--block-size N] [--codec base64] [-v]
//! ```
//!
//! Note: opening a raw ICMP socket requires root or CAP_NET_RAW.

use icmp_channel::config::{DEFAULT_BLOCK_SIZE, DEFAULT_IDENTIFIER};
use icmp_channel::logging::{Logger, StderrLog};
use icmp_channel::{ChannelConfig, CodecSelection, Sender, Session};
use std::sync::Arc;
use std::time::Duration;
use std::{env, fs, io, process};

mod utils;
use utils::{invalid, log_level, Args};

const USAGE: &str = "usage: sender <inputfile> <receiver> [--delay-ms N] [--id N] \
                     [--block-size N] [--codec none|base64] [-v]";

fn main() {
    if let Err(e) = run() {
        eprintln!("sender: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(env::args().skip(1))?;
    if args.flag("-h", "--help") {
        println!("{}", USAGE);
        return Ok(());
    }
    let (input, receiver) = match args.positional.as_slice() {
        [input, receiver] => (input.clone(), receiver.clone()),
        _ => return Err(invalid(USAGE.to_string()).into()),
    };

    let config = ChannelConfig::new()
        .block_size(args.option_or("block-size", DEFAULT_BLOCK_SIZE)?)
        .identifier(args.option_or("id", DEFAULT_IDENTIFIER)?)
        .inter_block_delay(Duration::from_millis(args.option_or("delay-ms", 0u64)?))
        .codec(args.option_or("codec", CodecSelection::None)?);

    let sink = Arc::new(StderrLog::new("client", log_level(args.flag("-v", "--verbose"))));
    let log = Logger::new(sink, "icmp_channel");

    let payload = match fs::read(&input) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log.warn(format_args!("{} not found, sending an empty payload", input));
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    let delay = config.inter_block_delay;
    let mut session = Session::new(config, log)?;
    session.open_raw()?;

    let report = Sender::new(&mut session).transfer(&payload, &receiver, delay)?;
    session.logger().info(format_args!(
        "Transfer complete: {} bytes in {} blocks (seq {}..={})",
        report.encoded_len, report.blocks, report.first_sequence, report.last_sequence
    ));
    Ok(())
}
