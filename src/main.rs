use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use dex_watch_bot::api::DexScreenerClient;
use dex_watch_bot::bot::WatchBot;
use dex_watch_bot::cli::Cli;
use dex_watch_bot::config::Config;
use dex_watch_bot::logging;
use dex_watch_bot::telegram::TelegramBot;
use dex_watch_bot::watchlist::Watchlist;
use dex_watch_bot::web::HealthServer;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.debug).context("failed to initialise logging")?;

    info!("Starting DEX watch bot...");

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load configuration from {:?}", path))?,
        None => Config::from_env().context("failed to load configuration from environment")?,
    };
    if let Some(port) = cli.port {
        config.port = port;
    }
    info!("Configuration loaded: chain={}, port={}", config.chain, config.port);

    let client = DexScreenerClient::from_config(&config).context("failed to build price data client")?;
    info!("Price data client ready for chain {}", client.chain());

    let handler = WatchBot::new(client, Watchlist::new(config.history_limit));
    let telegram = TelegramBot::new(config.telegram_token.clone(), config.admin_chat_id, handler);

    let health = HealthServer::new(config.port);
    info!("Health endpoint listening on {}", health.addr());
    tokio::spawn(async move {
        if let Err(e) = health.run().await {
            error!("Health endpoint stopped: {}", e);
        }
    });

    telegram.start().await.context("Telegram bot stopped")?;
    info!("Shutting down");
    Ok(())
}
