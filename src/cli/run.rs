//! Run command implementation

use crate::config::{Config, Secrets};
use crate::notify::{TelegramClient, TelegramConfig};
use crate::scanner::ScanLoop;
use crate::source::{CmcClient, CmcConfig};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Skip the startup announcement
    #[arg(long)]
    pub no_announce: bool,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let secrets = Secrets::from_env()?;

        let source = CmcClient::new(CmcConfig::from(&config.source), &secrets.cmc_api_key)?;
        let telegram = Arc::new(TelegramClient::new(
            TelegramConfig::from(&config.notify),
            &secrets.bot_token,
        )?);

        let scan_loop = ScanLoop::new(
            config,
            secrets.chat_id.clone(),
            Arc::new(source),
            Arc::clone(&telegram),
            telegram,
        );

        if self.no_announce {
            tracing::info!("Startup announcement disabled");
        }
        scan_loop.run(!self.no_announce).await
    }
}
