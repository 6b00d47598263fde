//! main - starts a MEC gateway that tunnels edge traffic to and from an eNB

use anyhow::{Result, ensure};
use async_std::channel::Sender;
use async_std::prelude::*;
use clap::Parser;
use gtpu::LengthCheck;
use mecgw::{Config, MecGw};
use signal_hook::consts::signal::*;
use signal_hook_async_std::Signals;
use slog::{Drain, Logger, o};
use std::net::{IpAddr, Ipv4Addr};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Local IP address of the gateway.  The gateway binds its GTP-U UDP
    /// socket on this address.  Defaults to the eth0 address.
    #[arg(long, default_value_t = local_ip_address::local_ip().unwrap())]
    local_ip: IpAddr,

    /// S1-U IPv4 address of the eNB.  All tunnelled downlink traffic is sent there.
    #[arg(long)]
    enb_addr: Ipv4Addr,

    /// Name of the Linux tun device to open for routing packets to/from the edge network.
    #[arg(long, default_value = "mec")]
    tun_name: String,

    /// UDP port used for GTP-U in both directions.  2152 is the registered port.
    #[arg(long, default_value_t = gtpu::GTPU_PORT)]
    gtpu_port: u16,

    /// Maximum number of learned UE address to TEID bindings kept at once.
    #[arg(long, default_value_t = 256)]
    endpoint_capacity: usize,

    /// Drop uplink datagrams whose GTP length field does not match the received datagram.
    #[arg(long)]
    strict_length: bool,
}

#[async_std::main]
async fn main() -> Result<()> {
    exit_on_panic();
    let logger = init_logging();

    let args = Args::parse();
    check_local_ip(&args.local_ip)?;
    check_enb_addr(&args.enb_addr)?;
    ensure!(
        args.endpoint_capacity >= 1,
        "Endpoint capacity must be at least 1"
    );

    let length_check = if args.strict_length {
        LengthCheck::Strict
    } else {
        LengthCheck::Lenient
    };

    let gw = MecGw::start(
        Config {
            ip_addr: args.local_ip,
            tun_name: args.tun_name,
            enb_addr: args.enb_addr,
            gtpu_port: args.gtpu_port,
            endpoint_capacity: args.endpoint_capacity,
            length_check,
        },
        logger,
    )
    .await?;

    wait_for_signal().await?;
    gw.graceful_shutdown().await;

    Ok(())
}

fn init_logging() -> Logger {
    // Use info level logging by default
    if std::env::var("RUST_LOG").is_err() {
        unsafe { std::env::set_var("RUST_LOG", "info") }
    }
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = slog_envlogger::new(drain);
    slog::Logger::root(drain, o!())
}

fn exit_on_panic() {
    let orig_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        std::process::exit(1);
    }));
}

fn check_local_ip(ip: &IpAddr) -> Result<()> {
    ensure!(
        !ip.is_unspecified(),
        "Unspecific IP address 0.0.0.0 not allowed for local IP - this must be an address that the eNB can send to"
    );
    Ok(())
}

fn check_enb_addr(ip: &Ipv4Addr) -> Result<()> {
    ensure!(
        !ip.is_unspecified(),
        "Unspecific IP address 0.0.0.0 not allowed for the eNB address"
    );
    Ok(())
}

async fn wait_for_signal() -> Result<i32> {
    let signals = Signals::new([SIGHUP, SIGTERM, SIGINT, SIGQUIT])?;
    let handle = signals.handle();
    let (sig_sender, sig_receiver) = async_std::channel::unbounded();
    let signals_task = async_std::task::spawn(handle_signals(signals, sig_sender));
    let signal = sig_receiver.recv().await;
    handle.close();
    signals_task.await;
    Ok(signal?)
}

async fn handle_signals(signals: Signals, sig_sender: Sender<i32>) {
    let mut signals = signals.fuse();
    while let Some(signal) = signals.next().await {
        match signal {
            SIGHUP => {
                // Reload configuration
                // Reopen the log file
            }
            SIGTERM | SIGINT | SIGQUIT => {
                // Shutdown the system;
                let _ = sig_sender.send(signal).await;
            }
            _ => unreachable!(),
        }
    }
}
