use anyhow::Result;
use async_std::fs::File;
use async_std::io::WriteExt;
use async_std::net::UdpSocket;
use async_trait::async_trait;
use std::net::SocketAddr;

/// Local delivery of a detunnelled packet.
#[async_trait]
pub trait InterfaceSink: Send + Sync + 'static {
    async fn deliver(&self, packet: &[u8]) -> Result<()>;
}

/// Transmission of a GTP-U datagram towards a tunnel peer.
#[async_trait]
pub trait PeerSink: Send + Sync + 'static {
    async fn send_to(&self, datagram: &[u8], peer: SocketAddr) -> Result<()>;
}

/// Writes detunnelled packets into the tun device.
pub struct TunSink(File);

impl TunSink {
    pub fn new(tun_writer: File) -> Self {
        Self(tun_writer)
    }
}

#[async_trait]
impl InterfaceSink for TunSink {
    async fn deliver(&self, packet: &[u8]) -> Result<()> {
        (&self.0).write(packet).await?;
        (&self.0).flush().await?;
        Ok(())
    }
}

/// Sends GTP-U datagrams on the gateway's UDP socket.
pub struct UdpPeerSink(UdpSocket);

impl UdpPeerSink {
    pub fn new(socket: UdpSocket) -> Self {
        Self(socket)
    }
}

#[async_trait]
impl PeerSink for UdpPeerSink {
    async fn send_to(&self, datagram: &[u8], peer: SocketAddr) -> Result<()> {
        self.0.send_to(datagram, peer).await?;
        Ok(())
    }
}
