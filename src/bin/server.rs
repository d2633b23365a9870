/*
 * Copyright 2025 Vijaykumar Singh
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! VendorHive Server - main binary for the marketplace API

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vendorhive::{Config, StorageBackendType, VendorHive};

#[derive(Parser)]
#[command(name = "vendorhive-server")]
#[command(about = "VendorHive marketplace API server")]
struct Args {
    #[arg(short, long, default_value = "config.toml", env = "VENDORHIVE_CONFIG")]
    config: PathBuf,

    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Storage backend: memory or mongodb
    #[arg(long, env = "VENDORHIVE_STORAGE")]
    storage: Option<StorageBackendType>,

    #[arg(long, env = "MONGODB_URI")]
    mongodb_uri: Option<String>,
}

/// Secrets come from the environment rather than the config file
fn apply_env_overrides(config: &mut Config) {
    if let Ok(secret) = std::env::var("VENDORHIVE_JWT_SECRET") {
        config.auth.jwt_secret = secret;
    }
    if let Ok(name) = std::env::var("CLOUDINARY_CLOUD_NAME") {
        config.media.cloud_name = Some(name);
    }
    if let Ok(key) = std::env::var("CLOUDINARY_API_KEY") {
        config.media.api_key = Some(key);
    }
    if let Ok(secret) = std::env::var("CLOUDINARY_API_SECRET") {
        config.media.api_secret = Some(secret);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    apply_env_overrides(&mut config);

    // Override with CLI arguments
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(storage) = args.storage {
        config.storage.backend = storage;
    }
    if let Some(uri) = args.mongodb_uri {
        config.storage.mongodb_uri = Some(uri);
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.monitoring.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();

    info!(
        "Starting VendorHive server on {}:{} with '{:?}' storage",
        config.server.bind_address, config.server.port, config.storage.backend
    );
    if config.media.is_configured() {
        info!("📷 Image uploads enabled");
    } else {
        info!("📷 Image uploads disabled, media credentials not set");
    }

    let mut app = match VendorHive::new(config).await {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize VendorHive: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = app.start().await {
        error!("Failed to start VendorHive: {}", e);
        std::process::exit(1);
    }

    info!("VendorHive server started successfully");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal, stopping server...");

    if let Err(e) = app.stop().await {
        error!("Error during shutdown: {}", e);
    }

    info!("VendorHive server stopped");
    Ok(())
}
