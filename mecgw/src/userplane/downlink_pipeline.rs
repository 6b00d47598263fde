use super::{InterfaceSink, PeerSink, TunnelRelay};
use anyhow::Result;
use async_std::io::ReadExt;
use async_std::task::{self, JoinHandle};
use async_tun::Tun;
use slog::{Logger, info};
use std::sync::Arc;
use stop_token::StopToken;
use stop_token::prelude::*;

pub struct DownlinkPipeline<I: InterfaceSink, P: PeerSink> {
    tun_device: Tun,
    relay: Arc<TunnelRelay<I, P>>,
    stop_token: StopToken,
}

impl<I: InterfaceSink, P: PeerSink> DownlinkPipeline<I, P> {
    pub fn new(tun_device: Tun, relay: Arc<TunnelRelay<I, P>>, stop_token: StopToken) -> Self {
        Self {
            tun_device,
            relay,
            stop_token,
        }
    }

    pub fn run(mut self, logger: Logger) -> JoinHandle<()> {
        task::spawn(async move {
            let mut buf = [0u8; 2000];
            loop {
                match self.handle_next_downlink_packet(&mut buf).await {
                    Ok(true) => (),
                    Ok(false) => break,
                    Err(e) => {
                        info!(logger, "Exiting downlink pipeline with error {e}");
                        break;
                    }
                }
            }
        })
    }

    // Ok(false) means the pipeline was told to stop.
    async fn handle_next_downlink_packet(&mut self, buf: &mut [u8; 2000]) -> Result<bool> {
        let Ok(read_result) = self
            .tun_device
            .reader()
            .read(&mut buf[..])
            .timeout_at(self.stop_token.clone())
            .await
        else {
            return Ok(false);
        };
        let bytes_read = read_result?;
        self.relay.process_downlink(&buf[..bytes_read]).await?;
        Ok(true)
    }
}
