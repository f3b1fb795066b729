use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ovm_bot::{config::Config, discord, SupportPipeline};
use ovm_persist::HistoryStoreBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();
    
    // Load configuration
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    
    // Initialize logging
    init_logging(&config);
    
    tracing::info!("Starting OVM support bot");
    tracing::info!(
        support_forum = config.discord.support_forum_id,
        staff_forum = config.discord.staff_forum_id,
        "Config loaded"
    );
    
    // Load thread histories
    let store = HistoryStoreBuilder::new()
        .file(config.history.path.clone())
        .build()
        .await?;
    tracing::info!(path = %config.history.path.display(), threads = store.thread_count().await, "History store ready");
    
    let pipeline = Arc::new(SupportPipeline::from_config(&config, Arc::new(store))?);
    
    discord::run(&config, pipeline).await
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    
    let registry = tracing_subscriber::registry().with(env_filter);
    
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
