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

//! # VendorHive - Service Marketplace API
//!
//! VendorHive connects customers with service vendors: vendors publish a
//! business profile and a catalog of services, customers book those services
//! and leave one review per vendor.
//!
//! ## Layout
//!
//! - **core**: domain types, configuration and errors
//! - **storage**: the `MarketplaceStore` trait with memory and MongoDB backends
//! - **services**: identity, catalog, booking, review and media logic
//! - **network**: axum REST surface and bearer-token middleware

pub mod core;
pub mod network;
pub mod services;
pub mod storage;

pub use crate::core::*;

use std::net::SocketAddr;
use std::sync::Arc;

use network::{AppState, RestServer};
use services::MarketplaceServices;
use storage::{MarketplaceStore, MarketplaceStoreFactory};

/// Main VendorHive application instance
pub struct VendorHive {
    store: Arc<dyn MarketplaceStore>,
    server: RestServer,
}

impl VendorHive {
    pub async fn new(config: Config) -> Result<Self> {
        tracing::info!("🚀 VendorHive::new - initializing marketplace");
        config.validate()?;

        let store = MarketplaceStoreFactory::create_store(&config.storage).await?;
        tracing::info!("✅ Storage backend '{}' ready", store.backend_name());

        let services = MarketplaceServices::new(store.clone(), &config);
        Self::with_services(config, store, services)
    }

    /// Assemble the application around prebuilt services
    pub fn with_services(
        config: Config,
        store: Arc<dyn MarketplaceStore>,
        services: MarketplaceServices,
    ) -> Result<Self> {
        let bind = format!("{}:{}", config.server.bind_address, config.server.port);
        let bind_addr: SocketAddr = bind.parse().map_err(|_| {
            VendorHiveError::Config(ConfigError::InvalidValue {
                field: "server.bind_address".to_string(),
                value: bind.clone(),
            })
        })?;

        let state = AppState {
            services,
            store: store.clone(),
        };
        let server = RestServer::new(bind_addr, state, &config);

        Ok(Self { store, server })
    }

    pub async fn start(&mut self) -> Result<SocketAddr> {
        self.server
            .start()
            .await
            .map_err(|e| VendorHiveError::Internal(format!("Failed to start REST server: {}", e)))
    }

    pub async fn stop(&mut self) -> Result<()> {
        self.server
            .stop()
            .await
            .map_err(|e| VendorHiveError::Internal(format!("Failed to stop REST server: {}", e)))?;
        self.store.close().await?;
        Ok(())
    }

    /// Address the server is bound to once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.local_addr()
    }
}
