//! Receive transfers from the ICMP covert channel
//!
//! Listens for echo requests carrying the configured identifier, answers
//! each accepted block with an echo reply, prints the transfer to stdout
//! and exits. A session carries one transfer: its sequence keeps counting
//! from where that transfer left off, so run the receiver again for the
//! next one. Ctrl-C stops the wait.
//!
//! To run this example:
//!
//! ```sh
//! cargo run --example receiver -- --bind 0.0.0.0 [--id N] [--timeout-ms N] [--block-size N] [--codec base64] [--encoding utf-8] [-v]
//! ```
//!
//! Note: opening a raw ICMP socket requires root or CAP_NET_RAW.

use icmp_channel::config::{DEFAULT_BLOCK_SIZE, DEFAULT_IDENTIFIER};
use icmp_channel::logging::{Logger, StderrLog};
use icmp_channel::{
    ChannelConfig, ChannelError, CodecSelection, Interrupt, Receiver, Session, TextEncoding,
};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use std::{env, process};

mod utils;
use utils::{invalid, log_level, Args};

const USAGE: &str = "usage: receiver --bind ADDR [--id N] [--timeout-ms N] [--block-size N] \
                     [--codec none|base64] [--encoding utf-8|ascii|latin-1] [-v]";

fn main() {
    if let Err(e) = run() {
        eprintln!("receiver: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(env::args().skip(1))?;
    if args.flag("-h", "--help") {
        println!("{}", USAGE);
        return Ok(());
    }
    let bind_addr: Ipv4Addr = match args.option("bind") {
        Some(addr) => addr
            .parse()
            .map_err(|e| invalid(format!("invalid --bind '{}': {}", addr, e)))?,
        None => return Err(invalid(USAGE.to_string()).into()),
    };

    let config = ChannelConfig::new()
        .bind_addr(bind_addr)
        .block_size(args.option_or("block-size", DEFAULT_BLOCK_SIZE)?)
        .identifier(args.option_or("id", DEFAULT_IDENTIFIER)?)
        .recv_timeout(Duration::from_millis(args.option_or("timeout-ms", 1000u64)?))
        .codec(args.option_or("codec", CodecSelection::None)?)
        .text_encoding(args.option_or("encoding", TextEncoding::Utf8)?);

    let sink = Arc::new(StderrLog::new("server", log_level(args.flag("-v", "--verbose"))));
    let timeout = config.recv_timeout;
    let mut session = Session::new(config, Logger::new(sink, "icmp_channel"))?;
    session.set_interrupt(Interrupt::on_sigint()?);
    session.open_raw()?;
    session
        .logger()
        .info(format_args!("Listening on {}", bind_addr));

    let mut receiver = Receiver::new(&mut session);
    let size = loop {
        match receiver.receive_size(timeout) {
            Ok(Some(size)) => break size,
            Ok(None) if receiver.session().is_open() => continue,
            Ok(None) | Err(ChannelError::Closed) => return Ok(()),
            Err(e) => return Err(e.into()),
        }
    };

    let text = match receiver.transfer(size, timeout) {
        Ok(data) => receiver
            .session()
            .codec()
            .text_encoding()
            .decode(data)
            .map_err(ChannelError::from)?,
        // Cut short by Ctrl-C: a partial payload is not worth reporting
        Err(ChannelError::Corrupt(_)) if !receiver.session().is_open() => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    if receiver.session().is_open() {
        println!("{}", text);
    }

    session.close();
    Ok(())
}
