//! Karmicup - reciprocal engagement marketplace for Reddit

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use karmicup::{
    config::Args,
    db::{LedgerStore, MemoryStore, MongoClient, MongoStore},
    reddit::RedditClient,
    server,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("karmicup={},info", args.log_level).into());
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let ledger = args.ledger_config();
    let reddit_config = args.reddit_config();

    info!("======================================");
    info!("  Karmicup - Reddit engagement ledger");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {} (db: {})", args.mongodb_uri, args.mongodb_db);
    info!("Reddit API: {}", reddit_config.base_url);
    info!(
        "Reddit retries: {} (delay {:?}, Retry-After cap {:?})",
        reddit_config.retry.max_retries,
        reddit_config.retry.retry_delay,
        reddit_config.retry.max_retry_after
    );
    info!(
        "Points: submit cost {}, starting balance {}",
        ledger.submit_cost, ledger.starting_points
    );
    info!("======================================");

    let jwt = args.jwt_validator()?;

    // MongoDB is required in production; dev mode falls back to memory
    let store: Arc<dyn LedgerStore> = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => Arc::new(MongoStore::open(&client).await?),
        Err(e) if args.dev_mode => {
            warn!("MongoDB connection failed (dev mode, using in-memory store): {}", e);
            Arc::new(MemoryStore::new())
        }
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    };
    info!("Ledger store: {}", store.backend_name());

    let reddit = Arc::new(RedditClient::new(reddit_config));

    let state = Arc::new(server::AppState::new(args, store, reddit, jwt));
    server::run(state).await?;

    Ok(())
}
