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

//! REST API handlers that delegate to the marketplace services

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{StatusCode, Uri},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use super::error::{ApiError, ApiResult};
use super::validation::{
    parse_id, BookingRequest, LoginRequest, PasswordChangeRequest, ProfileUpdateRequest,
    RegisterRequest, ReviewRequest, ServiceRequest, ServiceUpdateRequest, StatusRequest,
    ValidJson, VendorUpdateRequest,
};
use crate::core::{
    Booking, Review, ReviewWithUser, Service, User, Vendor, VendorDetails, VendorHiveError,
    VendorWithUser,
};
use crate::network::middleware::{auth_middleware, CurrentActor};
use crate::services::{AuthSession, ImageUpload, MarketplaceServices, Profile};
use crate::storage::MarketplaceStore;

/// Shared application state for REST handlers
#[derive(Clone)]
pub struct AppState {
    pub services: MarketplaceServices,
    pub store: Arc<dyn MarketplaceStore>,
}

/// Multipart slack on top of the image size limit
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create REST router with all endpoints
pub fn create_router(state: AppState, max_upload_mb: u64) -> Router {
    let body_limit = max_upload_mb as usize * 1024 * 1024 + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Identity
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/users/me", get(get_me).put(update_me))
        .route("/api/users/password", put(change_password))

        // Vendors
        .route("/api/vendors", get(list_vendors))
        .route("/api/vendors/search", get(search_vendors))
        .route("/api/vendors/me", put(update_my_vendor))
        .route("/api/vendors/:vendor_id", get(get_vendor))
        .route("/api/vendors/:vendor_id/services", get(list_vendor_services))
        .route("/api/vendors/:vendor_id/reviews", get(list_vendor_reviews))

        // Services
        .route("/api/services", post(create_service))
        .route("/api/services/vendor", get(list_my_services))
        .route(
            "/api/services/:service_id",
            get(get_service).put(update_service).delete(delete_service),
        )

        // Bookings
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/user", get(list_user_bookings))
        .route("/api/bookings/vendor", get(list_vendor_bookings))
        .route("/api/bookings/:booking_id/status", put(update_booking_status))

        // Reviews
        .route("/api/reviews", post(create_review))

        // Media
        .route("/api/upload", post(upload_image))

        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = state.store.health_check().await.unwrap_or(false);
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "healthy" } else { "unhealthy" },
            "service": "vendorhive",
            "storage": state.store.backend_name(),
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

/// JSON 404 for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    tracing::debug!("❓ No route for {}", uri.path());
    ApiError(VendorHiveError::not_found("Route", uri.path()))
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

pub async fn register(
    State(state): State<AppState>,
    ValidJson(registration): ValidJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthSession>)> {
    let session = state.services.identity.register(registration).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn login(
    State(state): State<AppState>,
    ValidJson(credentials): ValidJson<LoginRequest>,
) -> ApiResult<Json<AuthSession>> {
    let session = state
        .services
        .identity
        .login(&credentials.email, &credentials.password)
        .await?;
    Ok(Json(session))
}

pub async fn get_me(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Profile>> {
    Ok(Json(state.services.identity.profile(&actor).await?))
}

pub async fn update_me(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ValidJson(update): ValidJson<ProfileUpdateRequest>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.services.identity.update_profile(&actor, update).await?))
}

pub async fn change_password(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ValidJson(change): ValidJson<PasswordChangeRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state
        .services
        .identity
        .change_password(&actor, &change.current_password, &change.new_password)
        .await?;
    Ok(Json(json!({ "message": "Password updated successfully" })))
}

// ---------------------------------------------------------------------------
// Vendors
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct VendorListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VendorSearchQuery {
    pub q: Option<String>,
}

pub async fn list_vendors(
    State(state): State<AppState>,
    Query(query): Query<VendorListQuery>,
) -> ApiResult<Json<Vec<VendorWithUser>>> {
    Ok(Json(state.services.vendors.list(query.search.as_deref()).await?))
}

pub async fn search_vendors(
    State(state): State<AppState>,
    Query(query): Query<VendorSearchQuery>,
) -> ApiResult<Json<Vec<VendorWithUser>>> {
    Ok(Json(state.services.vendors.list(query.q.as_deref()).await?))
}

pub async fn get_vendor(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
) -> ApiResult<Json<VendorDetails>> {
    let id = parse_id(&vendor_id, "vendor")?;
    Ok(Json(state.services.vendors.details(id).await?))
}

pub async fn update_my_vendor(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ValidJson(patch): ValidJson<VendorUpdateRequest>,
) -> ApiResult<Json<Vendor>> {
    Ok(Json(state.services.vendors.update_own(&actor, patch).await?))
}

pub async fn list_vendor_services(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
) -> ApiResult<Json<Vec<Service>>> {
    let id = parse_id(&vendor_id, "vendor")?;
    Ok(Json(state.services.vendors.services_of(id).await?))
}

pub async fn list_vendor_reviews(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
) -> ApiResult<Json<Vec<ReviewWithUser>>> {
    let id = parse_id(&vendor_id, "vendor")?;
    Ok(Json(state.services.vendors.reviews_of(id).await?))
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

pub async fn create_service(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ValidJson(draft): ValidJson<ServiceRequest>,
) -> ApiResult<(StatusCode, Json<Service>)> {
    let service = state.services.catalog.create(&actor, draft).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn list_my_services(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<Service>>> {
    Ok(Json(state.services.catalog.list_mine(&actor).await?))
}

pub async fn get_service(
    State(state): State<AppState>,
    Path(service_id): Path<String>,
) -> ApiResult<Json<Service>> {
    let id = parse_id(&service_id, "service")?;
    Ok(Json(state.services.catalog.get(id).await?))
}

pub async fn update_service(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(service_id): Path<String>,
    ValidJson(patch): ValidJson<ServiceUpdateRequest>,
) -> ApiResult<Json<Service>> {
    let id = parse_id(&service_id, "service")?;
    Ok(Json(state.services.catalog.update(&actor, id, patch).await?))
}

pub async fn delete_service(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(service_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&service_id, "service")?;
    state.services.catalog.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

pub async fn create_booking(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ValidJson(draft): ValidJson<BookingRequest>,
) -> ApiResult<(StatusCode, Json<Booking>)> {
    let booking = state.services.bookings.create(&actor, draft).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn list_user_bookings(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<Booking>>> {
    Ok(Json(state.services.bookings.list_for_user(&actor).await?))
}

pub async fn list_vendor_bookings(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<Booking>>> {
    Ok(Json(state.services.bookings.list_for_vendor(&actor).await?))
}

pub async fn update_booking_status(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(booking_id): Path<String>,
    ValidJson(status): ValidJson<StatusRequest>,
) -> ApiResult<Json<Booking>> {
    let id = parse_id(&booking_id, "booking")?;
    Ok(Json(state.services.bookings.update_status(&actor, id, status).await?))
}

// ---------------------------------------------------------------------------
// Reviews and media
// ---------------------------------------------------------------------------

pub async fn create_review(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ValidJson(draft): ValidJson<ReviewRequest>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let receipt = state.services.reviews.create(&actor, draft).await?;
    Ok((StatusCode::CREATED, Json(receipt.review)))
}

/// Upload response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

pub async fn upload_image(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let malformed = |e: axum::extract::multipart::MultipartError| {
        ApiError(VendorHiveError::validation(format!("Malformed upload: {}", e)))
    };

    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(malformed)?;
        image = Some(ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let image = image.ok_or_else(|| ApiError(VendorHiveError::validation("No file uploaded")))?;
    let image_url = state.services.media.upload(&actor, image).await?;
    Ok((StatusCode::CREATED, Json(UploadResponse { image_url })))
}
