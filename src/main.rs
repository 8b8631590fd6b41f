mod auth;
mod bot;
mod config;
mod dialog;
mod sheets;
mod utils;

use anyhow::Result;
use auth::AuthRegistry;
use chrono::FixedOffset;
use config::Config;
use dialog::Engine;
use sheets::api::{GoogleSheetsApi, ServiceAccountKey};
use sheets::SheetsGateway;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "shift_bot=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let key = ServiceAccountKey::from_json(&config.service_account_json)?;
    let tz = FixedOffset::east_opt(config.tz_offset_hours * 3600)
        .ok_or_else(|| anyhow::anyhow!("TZ_OFFSET_HOURS is out of range"))?;

    let gateway = SheetsGateway::new(Box::new(GoogleSheetsApi::new(key, &config.sheet_id)), tz);
    let engine = Engine::new(gateway, AuthRegistry::new(), config.sheet_link());
    let bot = bot::Bot::new(bot::api::TelegramApi::new(&config.bot_token), engine);

    tracing::info!("Starting shift bot...");

    bot.run().await
}
