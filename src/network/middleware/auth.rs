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

//! Authentication middleware for the VendorHive HTTP API
//!
//! The middleware resolves an `Authorization: Bearer <token>` header, when one
//! is present, and records the outcome in the request extensions. Public routes
//! ignore it; protected handlers take a [`CurrentActor`] argument, which turns a
//! missing or rejected token into a 401 and a lookup failure into a 500.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, Request},
    middleware::Next,
    response::Response,
};

use crate::core::VendorHiveError;
use crate::network::rest::error::ApiError;
use crate::network::rest::handlers::AppState;
use crate::services::Actor;

/// Outcome of token resolution for one request
#[derive(Debug, Clone)]
pub enum AuthState {
    Authenticated(Actor),
    /// The token itself is bad or names no account
    Rejected(String),
    /// The token could not be checked, e.g. storage is down
    Failed(String),
}

/// Authentication middleware function
pub async fn auth_middleware<B>(
    State(state): State<AppState>,
    mut request: Request<B>,
    next: Next<B>,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string);

    if let Some(token) = token {
        let outcome = match state.services.identity.resolve_actor(&token).await {
            Ok(actor) => AuthState::Authenticated(actor),
            Err(e) if e.is_internal() => {
                tracing::error!("❌ Token resolution failed: {}", e);
                AuthState::Failed(e.to_string())
            }
            Err(e) => {
                tracing::warn!("🔐 Rejected bearer token on {}: {}", request.uri().path(), e);
                AuthState::Rejected(e.to_string())
            }
        };
        // Add the outcome to request extensions for use by handlers
        request.extensions_mut().insert(outcome);
    }

    next.run(request).await
}

/// Strip the `Bearer ` scheme; other schemes are ignored
fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// The authenticated caller; rejects the request with 401 otherwise, or 500
/// when the token could not be checked
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthState>() {
            Some(AuthState::Authenticated(actor)) => Ok(CurrentActor(actor.clone())),
            Some(AuthState::Rejected(reason)) => {
                Err(ApiError(VendorHiveError::Unauthenticated(reason.clone())))
            }
            Some(AuthState::Failed(cause)) => Err(ApiError(VendorHiveError::Internal(format!(
                "token resolution failed: {}",
                cause
            )))),
            None => Err(ApiError(VendorHiveError::Unauthenticated(
                "Authentication required".to_string(),
            ))),
        }
    }
}
