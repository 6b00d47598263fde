//! relay - wraps downlink packets for the eNB and unwraps uplink packets from it

use super::counters::downlink_counter_indices::*;
use super::counters::uplink_counter_indices::*;
use super::counters::{
    DownlinkCounters, UplinkCounters, new_downlink_counters, new_uplink_counters,
};
use super::{EndpointTable, IPV4_HEADER_LEN, InterfaceSink, PeerSink};
use crate::Config;
use anyhow::Result;
use atomic_counter::AtomicCounter;
use gtpu::{DecodeError, LengthCheck};
use slog::{Logger, debug};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;

/// Both directions of the tunnel between the edge network and the eNB.
///
/// Downlink packets are routed by the TEID previously learned for their
/// destination address; uplink datagrams teach the endpoint table which TEID
/// the eNB uses for which UE.  Traffic that cannot be routed is dropped and
/// counted; an error means a sink failed, which ends the owning pipeline.
pub struct TunnelRelay<I: InterfaceSink, P: PeerSink> {
    endpoint_table: EndpointTable,
    interface_sink: I,
    peer_sink: P,
    enb_addr: SocketAddr,
    length_check: LengthCheck,
    downlink_counters: Arc<DownlinkCounters>,
    uplink_counters: Arc<UplinkCounters>,
    logger: Logger,
}

impl<I: InterfaceSink, P: PeerSink> TunnelRelay<I, P> {
    pub fn new(config: &Config, interface_sink: I, peer_sink: P, logger: Logger) -> Self {
        TunnelRelay {
            endpoint_table: EndpointTable::new(config.endpoint_capacity),
            interface_sink,
            peer_sink,
            enb_addr: SocketAddr::V4(SocketAddrV4::new(config.enb_addr, config.gtpu_port)),
            length_check: config.length_check,
            downlink_counters: Arc::new(new_downlink_counters()),
            uplink_counters: Arc::new(new_uplink_counters()),
            logger,
        }
    }

    pub fn endpoint_table(&self) -> &EndpointTable {
        &self.endpoint_table
    }

    pub fn downlink_counters(&self) -> Arc<DownlinkCounters> {
        self.downlink_counters.clone()
    }

    pub fn uplink_counters(&self) -> Arc<UplinkCounters> {
        self.uplink_counters.clone()
    }

    /// Tunnel one packet read from the tun device to the eNB.
    pub async fn process_downlink(&self, packet: &[u8]) -> Result<()> {
        self.downlink_counters[DL_RX_PKTS].inc();
        self.downlink_counters[DL_RX_BYTES].add(packet.len());

        if packet.len() < IPV4_HEADER_LEN {
            self.downlink_counters[DL_DROP_TOO_SHORT].inc();
            return Ok(());
        }
        if packet[0] & 0xf0 != 0x40 {
            self.downlink_counters[DL_DROP_NOT_IPV4].inc();
            return Ok(());
        }

        // Route on the destination address in the packet's own IP header.
        let ue_addr = Ipv4Addr::new(packet[16], packet[17], packet[18], packet[19]);
        let Some(teid) = self.endpoint_table.lookup(ue_addr).await else {
            debug!(
                self.logger,
                "No binding for {ue_addr} - dropping downlink packet"
            );
            self.downlink_counters[DL_DROP_NO_BINDING].inc();
            return Ok(());
        };

        let datagram = match gtpu::encode(packet, teid) {
            Ok(datagram) => datagram,
            Err(e) => {
                debug!(self.logger, "Dropping downlink packet: {e}");
                self.downlink_counters[DL_DROP_OVERSIZE].inc();
                return Ok(());
            }
        };

        self.peer_sink.send_to(&datagram, self.enb_addr).await?;
        self.downlink_counters[DL_TX_PKTS].inc();
        Ok(())
    }

    /// Unwrap one datagram received on the GTP-U socket, learn the sender's
    /// binding from it, and deliver the inner packet to the edge network.
    pub async fn process_uplink(&self, datagram: &[u8]) -> Result<()> {
        self.uplink_counters[UL_RX_PKTS].inc();
        self.uplink_counters[UL_RX_BYTES].add(datagram.len());

        let (teid, inner) = match gtpu::decode(datagram, self.length_check) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!(self.logger, "Dropping uplink datagram: {e}");
                self.uplink_counters[drop_counter_index(&e)].inc();
                return Ok(());
            }
        };

        if inner.len() < IPV4_HEADER_LEN || inner[0] & 0xf0 != 0x40 {
            self.uplink_counters[UL_DROP_NOT_IPV4].inc();
            return Ok(());
        }

        // Learn from the inner source address.  The UDP source is the eNB's
        // transport address, not the UE.  A reserved TEID is stored too and
        // filtered on lookup.
        let ue_addr = Ipv4Addr::new(inner[12], inner[13], inner[14], inner[15]);
        self.endpoint_table.update(ue_addr, teid).await;

        self.interface_sink.deliver(inner).await?;
        self.uplink_counters[UL_TX_PKTS].inc();
        Ok(())
    }
}

fn drop_counter_index(e: &DecodeError) -> usize {
    match e {
        DecodeError::Truncated(_) => UL_DROP_TRUNCATED,
        DecodeError::UnsupportedFlags(_) | DecodeError::UnexpectedMessageType(_) => {
            UL_DROP_BAD_HEADER
        }
        DecodeError::LengthMismatch { .. } => UL_DROP_LENGTH_MISMATCH,
    }
}
