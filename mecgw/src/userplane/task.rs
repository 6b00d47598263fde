use super::counters::dump_stats;
use super::{DownlinkPipeline, TunSink, TunnelRelay, UdpPeerSink, UplinkPipeline};
use crate::{Config, ShutdownHandle};
use anyhow::{Context, Result, bail, ensure};
use async_std::fs::File;
use async_tun::{Tun, TunBuilder};
use slog::{Logger, info};
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, SocketAddr};
use std::os::fd::{AsRawFd, BorrowedFd};
use std::sync::Arc;
use stop_token::StopSource;

/// The running userplane: one pipeline task per direction plus the stats task.
pub struct UserplaneTask {
    tasks: Vec<ShutdownHandle>,
}

impl UserplaneTask {
    pub async fn start(config: &Config, logger: &Logger) -> Result<Self> {
        // Create the packet source/sinks.
        let gtpu_socket = create_gtpu_socket(config, logger)?;
        let gtpu_socket_clone = gtpu_socket.try_clone()?;
        let tun_device = open_tun_device(&config.tun_name, logger).await?;
        // The writer takes its own dup of the device fd.
        let tun_fd = unsafe { BorrowedFd::borrow_raw(tun_device.as_raw_fd()) };
        let tun_writer = File::from(std::fs::File::from(tun_fd.try_clone_to_owned()?));

        let relay = Arc::new(TunnelRelay::new(
            config,
            TunSink::new(tun_writer),
            UdpPeerSink::new(gtpu_socket_clone.into()),
            logger.clone(),
        ));

        // Start the downlink pipeline (tun -> eNB).
        let downlink_stop = StopSource::new();
        let downlink_task = DownlinkPipeline::new(tun_device, relay.clone(), downlink_stop.token())
            .run(logger.clone());

        // Start the uplink pipeline (eNB -> tun).
        let uplink_stop = StopSource::new();
        let uplink_task =
            UplinkPipeline::new(gtpu_socket.into(), relay.clone(), uplink_stop.token())
                .run(logger.clone());

        // Spawn the stats task.
        let stats_stop = StopSource::new();
        let stats_task = async_std::task::spawn(dump_stats(
            logger.clone(),
            relay.endpoint_table().clone(),
            relay.downlink_counters(),
            relay.uplink_counters(),
            stats_stop.token(),
        ));

        Ok(UserplaneTask {
            tasks: vec![
                ShutdownHandle::new(downlink_task, downlink_stop),
                ShutdownHandle::new(uplink_task, uplink_stop),
                ShutdownHandle::new(stats_task, stats_stop),
            ],
        })
    }

    pub async fn graceful_shutdown(self) {
        for task in self.tasks {
            task.graceful_shutdown().await;
        }
    }
}

fn create_gtpu_socket(config: &Config, logger: &Logger) -> Result<std::net::UdpSocket> {
    let transport_address = SocketAddr::new(config.ip_addr, config.gtpu_port);
    let domain = match config.ip_addr {
        IpAddr::V4(_) => Domain::IPV4,
        IpAddr::V6(_) => Domain::IPV6,
    };
    ensure!(matches!(config.ip_addr, IpAddr::V4(_)), "IPv6 not implemented");

    let gtpu_socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    gtpu_socket.set_reuse_port(true)?;
    gtpu_socket
        .bind(&transport_address.into())
        .context(format!("Failed to bind {}", transport_address))?;
    info!(logger, "Serving GTP-U on {transport_address}");
    Ok(gtpu_socket.into())
}

async fn open_tun_device(tun_device_name: &str, logger: &Logger) -> Result<Tun> {
    match TunBuilder::new()
        .name(tun_device_name)
        .tap(false)
        .packet_info(false)
        .try_build()
        .await
    {
        Ok(tun) => {
            info!(
                logger,
                "Opened tun device '{tun_device_name}' for the edge network"
            );
            Ok(tun)
        }
        Err(e) => bail!(
            "Failed to open TUN device '{tun_device_name}' - create it first, e.g. 'sudo ip tuntap add mode tun user $USER name {tun_device_name}'.
Device open error code: {e}
 EPERM: may indicate that the device doesn't exist or is not owned by the current user
 EINVAL: may indicate that the device is actually a tap device rather than a tun device
 EBUSY: another process, e.g. another mecgw instance, has the device open"
        ),
    }
}
