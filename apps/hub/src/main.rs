use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use logger::init_tracing;
use sentinel_store::{Store, StoreImpl, initialize_database, open_pool};
use tokio::net::TcpListener;
use tracing::info;

mod config;
mod hub;
mod seed;
mod server;

use config::Config;
use hub::{CallbackSweeper, Hub, ProbeScheduler};

#[derive(Debug, Parser)]
#[command(name = "hub", version, about = "Dispatches probes to validators and records their ticks")]
struct Args {
    /// Path to the hub config file
    #[arg(short, long, env = "SENTINEL_HUB_CONFIG")]
    config: Option<PathBuf>,

    /// Insert demo data before serving
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let config = Config::from_config(args.config.as_deref()).context("failed to load config")?;
    info!("{}", config);

    let pool = open_pool(&config.database.path, config.database.pool_size)
        .await
        .context("failed to open database")?;
    {
        let conn = pool.get().await.context("failed to get database connection")?;
        initialize_database(&conn).await.context("failed to run migrations")?;
    }
    let store: Arc<dyn Store> = Arc::new(StoreImpl::new_from_pool(pool));

    if args.seed {
        seed::seed(store.as_ref()).await.context("failed to seed database")?;
    }

    let hub = Arc::new(Hub::new(store, config.scheduler.reward_per_tick));
    let scheduler = ProbeScheduler::new(Arc::clone(&hub), config.probe_interval()).start();
    let sweeper =
        CallbackSweeper::new(Arc::clone(&hub), config.callback_ttl(), config.sweep_interval())
            .start();

    let listener = TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.server.listen))?;
    info!("Hub listening on {}", listener.local_addr()?);

    let result = tokio::select! {
        result = server::serve(listener, Arc::clone(&hub), config.server.outbound_queue) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    };

    scheduler.abort();
    sweeper.abort();
    result
}
