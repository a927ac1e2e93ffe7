//! Entry point: load config, wire the bridge, and watch until interrupted.

use notibridge::config::Config;
use notibridge::models::session::Identity;
use notibridge::NotificationBridge;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let user_id =
        std::env::var("USER_ID").map_err(|_| anyhow::anyhow!("USER_ID must be set"))?;
    let token =
        std::env::var("AUTH_TOKEN").map_err(|_| anyhow::anyhow!("AUTH_TOKEN must be set"))?;

    let bridge = NotificationBridge::new(&config);
    let handle = bridge.handle();
    tracing::info!(unread = handle.unread_count().await, "counter rehydrated");

    bridge
        .set_identity(Some(Identity::new(user_id, token)))
        .await?;
    tracing::info!(endpoint = %config.push_url, "push channel open");

    tokio::signal::ctrl_c().await?;
    tracing::info!("interrupt received, tearing down");
    bridge.set_identity(None).await?;
    Ok(())
}
