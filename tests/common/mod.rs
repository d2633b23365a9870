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

//! Shared helpers for REST integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use vendorhive::core::{
    Booking, BookingId, BookingStatus, NewBooking, NewReview, NewService, NewUser, NewVendor,
    ReviewReceipt, ReviewWithUser, Service, ServiceId, ServicePatch, User, UserId, UserPatch,
    Vendor, VendorId, VendorPatch, VendorWithUser,
};
use vendorhive::network::{create_router, AppState};
use vendorhive::services::{ImageUpload, MarketplaceServices, MediaService, MediaUploader};
use vendorhive::storage::{MarketplaceStore, MemoryMarketplaceStore};
use vendorhive::{Config, Result, VendorHiveError};

pub const MULTIPART_BOUNDARY: &str = "vendorhive-test-boundary";

/// Uploader that never leaves the process
pub struct RecordingUploader;

#[async_trait]
impl MediaUploader for RecordingUploader {
    async fn upload_image(&self, image: ImageUpload) -> vendorhive::Result<String> {
        Ok(format!("https://media.test/vendorhive/{}", image.file_name))
    }
}

/// Memory store whose user reads or vendor inserts can be made to fail
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryMarketplaceStore,
    fail_user_reads: AtomicBool,
    fail_vendor_inserts: AtomicBool,
}

impl FlakyStore {
    pub fn fail_user_reads(&self, fail: bool) {
        self.fail_user_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_vendor_inserts(&self, fail: bool) {
        self.fail_vendor_inserts.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("storage offline").into());
        }
        Ok(())
    }
}

#[async_trait]
impl MarketplaceStore for FlakyStore {
    fn backend_name(&self) -> &'static str {
        "flaky"
    }

    async fn initialize(&mut self) -> Result<()> {
        self.inner.initialize().await
    }

    async fn health_check(&self) -> Result<bool> {
        self.inner.health_check().await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        Self::check(&self.fail_user_reads)?;
        self.inner.get_user(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Self::check(&self.fail_user_reads)?;
        self.inner.get_user_by_email(email).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Self::check(&self.fail_user_reads)?;
        self.inner.get_user_by_username(username).await
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.inner.create_user(user).await
    }

    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<Option<User>> {
        self.inner.update_user(id, patch).await
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        self.inner.delete_user(id).await
    }

    async fn get_vendor(&self, id: VendorId) -> Result<Option<Vendor>> {
        self.inner.get_vendor(id).await
    }

    async fn get_vendor_by_user_id(&self, user_id: UserId) -> Result<Option<Vendor>> {
        self.inner.get_vendor_by_user_id(user_id).await
    }

    async fn create_vendor(&self, vendor: NewVendor) -> Result<Vendor> {
        Self::check(&self.fail_vendor_inserts)?;
        self.inner.create_vendor(vendor).await
    }

    async fn update_vendor(&self, id: VendorId, patch: VendorPatch) -> Result<Option<Vendor>> {
        self.inner.update_vendor(id, patch).await
    }

    async fn list_vendors(&self) -> Result<Vec<VendorWithUser>> {
        self.inner.list_vendors().await
    }

    async fn search_vendors(&self, query: &str) -> Result<Vec<VendorWithUser>> {
        self.inner.search_vendors(query).await
    }

    async fn create_service(&self, service: NewService) -> Result<Service> {
        self.inner.create_service(service).await
    }

    async fn get_service(&self, id: ServiceId) -> Result<Option<Service>> {
        self.inner.get_service(id).await
    }

    async fn list_services_by_vendor(&self, vendor_id: VendorId) -> Result<Vec<Service>> {
        self.inner.list_services_by_vendor(vendor_id).await
    }

    async fn update_service(&self, id: ServiceId, patch: ServicePatch) -> Result<Option<Service>> {
        self.inner.update_service(id, patch).await
    }

    async fn delete_service(&self, id: ServiceId) -> Result<bool> {
        self.inner.delete_service(id).await
    }

    async fn create_booking(&self, booking: NewBooking) -> Result<Booking> {
        self.inner.create_booking(booking).await
    }

    async fn get_booking(&self, id: BookingId) -> Result<Option<Booking>> {
        self.inner.get_booking(id).await
    }

    async fn list_bookings_by_user(&self, user_id: UserId) -> Result<Vec<Booking>> {
        self.inner.list_bookings_by_user(user_id).await
    }

    async fn list_bookings_by_vendor(&self, vendor_id: VendorId) -> Result<Vec<Booking>> {
        self.inner.list_bookings_by_vendor(vendor_id).await
    }

    async fn update_booking_status(
        &self,
        id: BookingId,
        status: BookingStatus,
        expected: Option<BookingStatus>,
    ) -> Result<Option<Booking>> {
        self.inner.update_booking_status(id, status, expected).await
    }

    async fn create_review(&self, review: NewReview) -> Result<ReviewReceipt> {
        self.inner.create_review(review).await
    }

    async fn list_reviews_by_vendor(&self, vendor_id: VendorId) -> Result<Vec<ReviewWithUser>> {
        self.inner.list_reviews_by_vendor(vendor_id).await
    }

    async fn close(&self) -> Result<()> {
        self.inner.close().await
    }
}

/// Router over a [`FlakyStore`]; the handle toggles its failures
pub async fn flaky_app() -> (TestApp, Arc<FlakyStore>) {
    let mut store = FlakyStore::default();
    store.initialize().await.unwrap();
    let store = Arc::new(store);
    let app = test_app_over(store.clone(), Config::default());
    (app, store)
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn MarketplaceStore>,
}

/// Router over a fresh memory store with default configuration
pub async fn test_app() -> TestApp {
    test_app_with(Config::default()).await
}

pub async fn test_app_with(config: Config) -> TestApp {
    let mut store = MemoryMarketplaceStore::new();
    store.initialize().await.unwrap();
    test_app_over(Arc::new(store), config)
}

pub fn test_app_over(store: Arc<dyn MarketplaceStore>, config: Config) -> TestApp {
    let media = MediaService::new(Arc::new(RecordingUploader), &config.media);
    let services = MarketplaceServices::with_media(store.clone(), &config, media);
    let state = AppState {
        services,
        store: store.clone(),
    };

    TestApp {
        router: create_router(state, config.media.max_upload_mb),
        store,
    }
}

impl TestApp {
    /// Send a JSON request and decode the JSON response (Null for empty bodies)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.dispatch(request).await
    }

    pub async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    /// Register a customer account; returns (token, user)
    pub async fn register_user(&self, username: &str) -> (String, Value) {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "name": format!("{} Customer", username),
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "secret123",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {}: {}", username, body);
        (body["token"].as_str().unwrap().to_string(), body["user"].clone())
    }

    /// Register a vendor account; returns (token, user, vendor id)
    pub async fn register_vendor(&self, username: &str, business: &str) -> (String, Value, i64) {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "name": format!("{} Owner", username),
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "secret123",
                    "role": "vendor",
                    "vendor": {
                        "businessName": business,
                        "category": "Photography",
                        "description": format!("{} takes great pictures", business),
                    }
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {}: {}", username, body);
        let token = body["token"].as_str().unwrap().to_string();

        let (status, me) = self.get("/api/users/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        let vendor_id = me["vendorProfile"]["id"].as_i64().unwrap();
        (token, body["user"].clone(), vendor_id)
    }

    /// Create a service as the given vendor; returns the service id
    pub async fn create_service(&self, token: &str, name: &str) -> i64 {
        let (status, body) = self
            .post(
                "/api/services",
                Some(token),
                json!({
                    "name": name,
                    "category": "Photography",
                    "description": "Two hours on location",
                    "price": "$50",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create service: {}", body);
        body["id"].as_i64().unwrap()
    }
}

/// Build a multipart upload with a single file field
pub fn multipart_request(
    token: Option<&str>,
    field: &str,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}
