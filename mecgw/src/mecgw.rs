use crate::Config;
use crate::userplane::UserplaneTask;
use anyhow::Result;
use slog::{Logger, info};

/// A running MEC gateway.
pub struct MecGw {
    userplane: UserplaneTask,
    logger: Logger,
}

impl MecGw {
    pub async fn start(config: Config, logger: Logger) -> Result<Self> {
        info!(
            &logger,
            "Tunnel edge traffic between tun device '{}' and eNB {}",
            config.tun_name,
            config.enb_addr
        );
        let userplane = UserplaneTask::start(&config, &logger).await?;
        Ok(MecGw { userplane, logger })
    }

    pub async fn graceful_shutdown(self) {
        info!(&self.logger, "Shutting down");
        self.userplane.graceful_shutdown().await;
    }
}
