//! `annai gateway` — start the HTTP server.

use anyhow::Context;

use annai_config::AppConfig;

pub async fn run(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = AppConfig::load().context("Failed to load config")?;

    if let Some(port) = port {
        config.gateway.port = port;
    }

    annai_gateway::start(config)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))
}
