use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use clap::Parser;
use logger::init_tracing;
use sentinel_store::{Store, StoreImpl, open_pool};
use tracing::{info, warn};

mod auth;
mod config;
mod error;
mod routes;

use auth::{API_TOKENS_ENV, TokenTable};
use config::Config;
use error::AppError;

#[derive(Debug, Parser)]
#[command(name = "api", version, about = "HTTP API for managing monitored targets")]
struct Args {
    /// Path to the API config file
    #[arg(short, long, env = "SENTINEL_API_CONFIG")]
    config: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let config = Config::from_config(args.config.as_deref())?;
    info!("{}", config);

    let tokens = TokenTable::parse(&std::env::var(API_TOKENS_ENV).unwrap_or_default());
    if tokens.is_empty() {
        warn!("{} is empty, every authenticated route will answer 401", API_TOKENS_ENV);
    } else {
        info!("Loaded {} API tokens", tokens.len());
    }

    let pool = open_pool(&config.database.path, config.database.pool_size).await?;
    let store: Arc<dyn Store> = Arc::new(StoreImpl::new_from_pool(pool));

    let addr: SocketAddr = config.server.listen.parse()?;
    run_server(addr, web::Data::from(store), web::Data::new(tokens)).await
}

async fn run_server(
    addr: SocketAddr,
    store: web::Data<dyn Store>,
    tokens: web::Data<TokenTable>,
) -> Result<(), AppError> {
    info!("API listening on {}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .app_data(tokens.clone())
            .configure(routes::routes)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
