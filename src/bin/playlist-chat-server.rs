// ABOUTME: Server binary for the playlist chat backend
// ABOUTME: Loads configuration, initializes logging and storage, then serves HTTP until Ctrl+C
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

//! # Playlist Chat Server Binary

use anyhow::Result;
use clap::Parser;
use playlist_chat::{
    config::ServerConfig,
    logging,
    server::{run_server, ServerResources},
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "playlist-chat-server")]
#[command(about = "Playlist Chat - build Spotify playlists through a conversation")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database.url = database_url;
    }

    info!("Starting Playlist Chat Server");
    info!("{}", config.summary());

    let resources = Arc::new(ServerResources::from_config(config).await?);

    if let Err(e) = run_server(resources).await {
        error!("Server error: {e}");
        return Err(e);
    }

    Ok(())
}
