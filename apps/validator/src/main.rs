use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use logger::init_tracing;
use sentinel::HttpProber;
use sentinel::crypto::{generate_keypair, save_keypair};
use tracing::info;

mod client;
mod config;
mod identity;
mod node;

use client::{Backoff, connection_loop};
use config::Config;
use identity::{PRIVATE_KEY_ENV, load_identity};
use node::ValidatorNode;

#[derive(Debug, Parser)]
#[command(name = "validator", version, about = "Probes targets on behalf of a sentinel hub")]
struct Args {
    /// Path to the validator config file
    #[arg(short, long, env = "SENTINEL_VALIDATOR_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Connect to the hub and answer probes (default)
    Run,
    /// Write a new secret key file and print its public key
    Keygen {
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    match args.command.unwrap_or(Command::Run) {
        Command::Keygen { out } => keygen(&out),
        Command::Run => run(args.config).await,
    }
}

fn keygen(out: &std::path::Path) -> anyhow::Result<()> {
    if out.exists() {
        anyhow::bail!("refusing to overwrite existing key file {}", out.display());
    }
    let keypair = generate_keypair();
    save_keypair(&keypair, out)?;
    println!("{}", keypair.public_key_hex());
    Ok(())
}

async fn run(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = Config::from_config(config_path.as_deref()).context("failed to load config")?;
    info!("{}", config);

    let env_key = std::env::var(PRIVATE_KEY_ENV).ok();
    let keypair = load_identity(env_key.as_deref(), config.node.key_file.as_deref())
        .with_context(|| format!("set {} or node.key_file", PRIVATE_KEY_ENV))?;
    info!("Validator public key: {}", keypair.public_key_hex());

    let prober = Arc::new(HttpProber::new(config.probe_timeout())?);
    let node = ValidatorNode::new(keypair, config.node.ip.clone());
    let backoff = Backoff::new(config.initial_backoff(), config.max_backoff());

    tokio::select! {
        _ = connection_loop(config.hub.url.clone(), node, prober, backoff) => {}
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }
    Ok(())
}
