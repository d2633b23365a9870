// Copyright 2025 Vijaykumar Singh
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Marketplace Storage Backends
//!
//! Two interchangeable implementations of [`MarketplaceStore`]:
//! - Memory - process-local maps behind a single lock (development/testing)
//! - MongoDB - document store for deployments
//!
//! Both backends allocate ids, enforce the unique user fields and keep the
//! vendor rating aggregate consistent without help from the caller.

pub mod memory_backend;
pub mod mongodb_backend;

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use crate::core::{
    Booking, BookingId, BookingStatus, NewBooking, NewReview, NewService, NewUser, NewVendor,
    Result, ReviewReceipt, ReviewWithUser, Service, ServiceId, ServicePatch, StorageBackendType,
    StorageConfig, User, UserId, UserPatch, Vendor, VendorId, VendorPatch, VendorWithUser,
};

/// Storage interface between the service layer and persistence
///
/// Lookups return `Ok(None)` for missing records. Writes that would violate a
/// uniqueness rule fail with `VendorHiveError::Conflict`; writes against a
/// missing parent fail with `VendorHiveError::NotFound`.
#[async_trait]
pub trait MarketplaceStore: Send + Sync {
    /// Backend name for identification
    fn backend_name(&self) -> &'static str;

    /// Open connections, create indexes
    async fn initialize(&mut self) -> Result<()>;

    /// Health check
    async fn health_check(&self) -> Result<bool>;

    // Users

    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Insert a user; email and username must be unused
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<Option<User>>;

    /// Remove a user and release its email and username; false when absent
    async fn delete_user(&self, id: UserId) -> Result<bool>;

    // Vendors

    async fn get_vendor(&self, id: VendorId) -> Result<Option<Vendor>>;

    async fn get_vendor_by_user_id(&self, user_id: UserId) -> Result<Option<Vendor>>;

    /// Insert a vendor profile with an empty rating aggregate
    async fn create_vendor(&self, vendor: NewVendor) -> Result<Vendor>;

    async fn update_vendor(&self, id: VendorId, patch: VendorPatch) -> Result<Option<Vendor>>;

    /// All vendors joined with their owning user, in id order
    async fn list_vendors(&self) -> Result<Vec<VendorWithUser>>;

    /// Case-insensitive substring match on business name, category,
    /// description and the owner's name
    async fn search_vendors(&self, query: &str) -> Result<Vec<VendorWithUser>>;

    // Services

    async fn create_service(&self, service: NewService) -> Result<Service>;

    async fn get_service(&self, id: ServiceId) -> Result<Option<Service>>;

    async fn list_services_by_vendor(&self, vendor_id: VendorId) -> Result<Vec<Service>>;

    async fn update_service(&self, id: ServiceId, patch: ServicePatch) -> Result<Option<Service>>;

    /// Returns false when nothing was deleted
    async fn delete_service(&self, id: ServiceId) -> Result<bool>;

    // Bookings

    async fn create_booking(&self, booking: NewBooking) -> Result<Booking>;

    async fn get_booking(&self, id: BookingId) -> Result<Option<Booking>>;

    async fn list_bookings_by_user(&self, user_id: UserId) -> Result<Vec<Booking>>;

    async fn list_bookings_by_vendor(&self, vendor_id: VendorId) -> Result<Vec<Booking>>;

    /// Set a booking's status. With `expected` given, the write only happens
    /// while the stored status still equals it; otherwise the call fails with
    /// `VendorHiveError::Conflict` and nothing changes.
    async fn update_booking_status(
        &self,
        id: BookingId,
        status: BookingStatus,
        expected: Option<BookingStatus>,
    ) -> Result<Option<Booking>>;

    // Reviews

    /// Insert a review and fold its rating into the vendor aggregate. Either
    /// both writes land or neither does. A second review by the same user for
    /// the same vendor is a conflict.
    async fn create_review(&self, review: NewReview) -> Result<ReviewReceipt>;

    /// Reviews for a vendor joined with the reviewing user, newest first
    async fn list_reviews_by_vendor(&self, vendor_id: VendorId) -> Result<Vec<ReviewWithUser>>;

    /// Close/cleanup backend
    async fn close(&self) -> Result<()>;
}

/// Backend factory for creating different backend implementations
pub struct MarketplaceStoreFactory;

impl MarketplaceStoreFactory {
    /// Create and initialize the backend selected by configuration
    pub async fn create_store(config: &StorageConfig) -> Result<Arc<dyn MarketplaceStore>> {
        match config.backend {
            StorageBackendType::Memory => {
                let mut store = memory_backend::MemoryMarketplaceStore::new();
                store.initialize().await?;
                Ok(Arc::new(store))
            }
            StorageBackendType::MongoDB => {
                let mut store = mongodb_backend::MongoMarketplaceStore::new(config.clone());
                store.initialize().await?;
                Ok(Arc::new(store))
            }
        }
    }
}

/// Run `undo` when `result` is an error, then hand the original error back
///
/// Used where a store spans more than one write: a failed second write rolls
/// the first one back. A failing undo is logged and does not mask the cause.
pub(crate) async fn undo_on_error<T, U, F, Fut>(result: Result<T>, undo: F) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<U>>,
{
    match result {
        Ok(value) => Ok(value),
        Err(cause) => {
            if let Err(undo_err) = undo().await {
                tracing::error!("❌ Rollback after '{}' failed: {}", cause, undo_err);
            }
            Err(cause)
        }
    }
}

/// Lowercased substring test used by the in-process search path
pub(crate) fn matches_query(vendor: &Vendor, owner: &User, needle_lower: &str) -> bool {
    [
        vendor.business_name.as_str(),
        vendor.category.as_str(),
        vendor.description.as_str(),
        owner.name.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle_lower))
}
