use super::{InterfaceSink, PeerSink, TunnelRelay};
use anyhow::Result;
use async_std::net::UdpSocket;
use async_std::task::{self, JoinHandle};
use slog::{Logger, info};
use std::sync::Arc;
use stop_token::StopToken;
use stop_token::prelude::*;

pub struct UplinkPipeline<I: InterfaceSink, P: PeerSink> {
    gtpu_socket: UdpSocket,
    relay: Arc<TunnelRelay<I, P>>,
    stop_token: StopToken,
}

impl<I: InterfaceSink, P: PeerSink> UplinkPipeline<I, P> {
    pub fn new(
        gtpu_socket: UdpSocket,
        relay: Arc<TunnelRelay<I, P>>,
        stop_token: StopToken,
    ) -> Self {
        Self {
            gtpu_socket,
            relay,
            stop_token,
        }
    }

    pub fn run(mut self, logger: Logger) -> JoinHandle<()> {
        task::spawn(async move {
            let mut buf = [0u8; 2000];
            loop {
                match self.handle_next_uplink_packet(&mut buf).await {
                    Ok(true) => (),
                    Ok(false) => break,
                    Err(e) => {
                        info!(logger, "Exiting uplink pipeline with error {e}");
                        break;
                    }
                }
            }
        })
    }

    // Ok(false) means the pipeline was told to stop.
    async fn handle_next_uplink_packet(&mut self, buf: &mut [u8; 2000]) -> Result<bool> {
        let Ok(recv_result) = self
            .gtpu_socket
            .recv_from(buf)
            .timeout_at(self.stop_token.clone())
            .await
        else {
            return Ok(false);
        };
        let (bytes_read, _peer) = recv_result?;
        self.relay.process_uplink(&buf[..bytes_read]).await?;
        Ok(true)
    }
}
