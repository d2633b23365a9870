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

//! REST server implementation using axum

use axum::http::HeaderValue;
use axum::Router;
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{create_router, AppState};
use crate::core::{Config, CorsConfig};

/// REST server for VendorHive
pub struct RestServer {
    router: Option<Router>,
    bind_addr: SocketAddr,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RestServer {
    /// Create new REST server
    pub fn new(bind_addr: SocketAddr, state: AppState, config: &Config) -> Self {
        let router = create_router(state, config.media.max_upload_mb).layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.cors)),
        );

        Self {
            router: Some(router),
            bind_addr,
            local_addr: None,
            shutdown_tx: None,
            handle: None,
        }
    }

    /// Bind the listener and serve in the background; returns the bound address
    pub async fn start(&mut self) -> anyhow::Result<SocketAddr> {
        let router = self
            .router
            .take()
            .ok_or_else(|| anyhow::anyhow!("REST server already started"))?;

        tracing::info!("🌐 Starting REST server on {}", self.bind_addr);

        let server = axum::Server::try_bind(&self.bind_addr)?.serve(router.into_make_service());
        let local_addr = server.local_addr();

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let graceful = server.with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            tracing::debug!("REST server graceful shutdown signal received");
        });

        let handle = tokio::spawn(async move {
            if let Err(e) = graceful.await {
                tracing::error!("❌ REST server error: {}", e);
            }
        });

        self.local_addr = Some(local_addr);
        self.shutdown_tx = Some(shutdown_tx);
        self.handle = Some(handle);

        tracing::info!("✅ REST server listening on {}", local_addr);
        Ok(local_addr)
    }

    /// Signal graceful shutdown and wait for in-flight requests
    pub async fn stop(&mut self) -> anyhow::Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await?;
            tracing::info!("🛑 REST server stopped");
        }
        Ok(())
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

/// CORS policy; an empty origin list allows any origin
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("⚠️ Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
