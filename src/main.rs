//! Trie-X server binary.
//!
//! Loads the configuration, restores the last snapshot and serves the
//! keyword index until Ctrl-C, then drains and writes a final snapshot.

use std::path::PathBuf;

use clap::Parser;
use triex_core::ServerConfig;
use triex_transport::TrieServer;

/// Command line arguments. Flags override the configuration file.
#[derive(Parser, Debug)]
#[command(name = "trie-x")]
#[command(about = "Networked keyword trie with periodic snapshots")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory for snapshot blobs
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }

    let server = TrieServer::bind(config).await?;
    tracing::info!("Trie-X ready on {}", server.local_addr()?);

    let index = server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Ctrl-C handler failed: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    tracing::info!("Trie-X stopped with {} keywords", index.len());
    Ok(())
}
