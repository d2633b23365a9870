// Copyright 2025 Vijaykumar Singh
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! In-Memory Marketplace Backend
//!
//! Fast in-memory backend for marketplace records.
//! Ideal for testing, development, and scenarios where persistence is not required.
//! All tables sit behind one lock, so multi-step writes (id allocation,
//! uniqueness checks, rating aggregation) cannot interleave.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{matches_query, MarketplaceStore};
use crate::core::{
    Booking, BookingId, BookingStatus, NewBooking, NewReview, NewService, NewUser, NewVendor,
    RatingAggregate, Result, Review, ReviewId, ReviewReceipt, ReviewWithUser, Service, ServiceId,
    ServicePatch, User, UserId, UserPatch, Vendor, VendorHiveError, VendorId, VendorPatch,
    VendorWithUser,
};

/// In-memory marketplace backend
pub struct MemoryMarketplaceStore {
    /// Every table and index, guarded together
    tables: Arc<RwLock<MemoryTables>>,

    /// Set once initialized
    initialized: bool,
}

#[derive(Debug, Default)]
struct MemoryTables {
    users: BTreeMap<UserId, User>,
    vendors: BTreeMap<VendorId, Vendor>,
    services: BTreeMap<ServiceId, Service>,
    bookings: BTreeMap<BookingId, Booking>,
    reviews: BTreeMap<ReviewId, Review>,
    indexes: MemoryIndexes,
    sequences: Sequences,
}

/// In-memory indexes for the lookups the API performs by natural key
#[derive(Debug, Default)]
struct MemoryIndexes {
    /// Index by email
    by_email: HashMap<String, UserId>,

    /// Index by username
    by_username: HashMap<String, UserId>,

    /// Vendor profile by owning user
    vendor_by_user: HashMap<UserId, VendorId>,
}

/// Last id handed out per table
#[derive(Debug, Default)]
struct Sequences {
    user: i64,
    vendor: i64,
    service: i64,
    booking: i64,
    review: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

impl MemoryMarketplaceStore {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(MemoryTables::default())),
            initialized: false,
        }
    }

    fn join_vendor(tables: &MemoryTables, vendor: &Vendor) -> Option<VendorWithUser> {
        tables.users.get(&vendor.user_id).map(|user| VendorWithUser {
            vendor: vendor.clone(),
            user: user.clone(),
        })
    }
}

impl Default for MemoryMarketplaceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketplaceStore for MemoryMarketplaceStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn initialize(&mut self) -> Result<()> {
        tracing::info!("🚀 Initializing in-memory marketplace backend");
        tracing::info!("💾 Mode: Non-persistent (testing/development)");
        self.initialized = true;
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.initialized)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .indexes
            .by_email
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .indexes
            .by_username
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;

        if tables.indexes.by_email.contains_key(&user.email) {
            return Err(VendorHiveError::Conflict("Email already in use".to_string()));
        }
        if tables.indexes.by_username.contains_key(&user.username) {
            return Err(VendorHiveError::Conflict("Username already taken".to_string()));
        }

        let id = next(&mut tables.sequences.user);
        let record = User {
            id,
            name: user.name,
            username: user.username,
            email: user.email,
            password: user.password_hash,
            role: user.role,
            profile_image: user.profile_image,
            phone: user.phone,
            bio: user.bio,
            location: user.location,
            joined_at: Utc::now(),
        };
        tables.indexes.by_email.insert(record.email.clone(), id);
        tables.indexes.by_username.insert(record.username.clone(), id);
        tables.users.insert(id, record.clone());
        drop(tables);

        tracing::debug!("📝 Created user in memory: {}", id);
        Ok(record)
    }

    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<Option<User>> {
        let mut tables = self.tables.write().await;
        let Some(existing) = tables.users.get(&id).cloned() else {
            return Ok(None);
        };

        if let Some(email) = &patch.email {
            if tables.indexes.by_email.get(email).is_some_and(|owner| *owner != id) {
                return Err(VendorHiveError::Conflict("Email already in use".to_string()));
            }
        }
        if let Some(username) = &patch.username {
            if tables.indexes.by_username.get(username).is_some_and(|owner| *owner != id) {
                return Err(VendorHiveError::Conflict("Username already taken".to_string()));
            }
        }

        let mut updated = existing.clone();
        patch.apply(&mut updated);

        // Re-point the unique indexes
        tables.indexes.by_email.remove(&existing.email);
        tables.indexes.by_username.remove(&existing.username);
        tables.indexes.by_email.insert(updated.email.clone(), id);
        tables.indexes.by_username.insert(updated.username.clone(), id);
        tables.users.insert(id, updated.clone());

        tracing::debug!("📝 Updated user in memory: {}", id);
        Ok(Some(updated))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.remove(&id) else {
            return Ok(false);
        };
        tables.indexes.by_email.remove(&user.email);
        tables.indexes.by_username.remove(&user.username);

        tracing::debug!("🗑️ Deleted user from memory: {}", id);
        Ok(true)
    }

    async fn get_vendor(&self, id: VendorId) -> Result<Option<Vendor>> {
        let tables = self.tables.read().await;
        Ok(tables.vendors.get(&id).cloned())
    }

    async fn get_vendor_by_user_id(&self, user_id: UserId) -> Result<Option<Vendor>> {
        let tables = self.tables.read().await;
        Ok(tables
            .indexes
            .vendor_by_user
            .get(&user_id)
            .and_then(|id| tables.vendors.get(id))
            .cloned())
    }

    async fn create_vendor(&self, vendor: NewVendor) -> Result<Vendor> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&vendor.user_id) {
            return Err(VendorHiveError::not_found("User", vendor.user_id));
        }
        if tables.indexes.vendor_by_user.contains_key(&vendor.user_id) {
            return Err(VendorHiveError::Conflict(
                "Vendor profile already exists for this user".to_string(),
            ));
        }

        let id = next(&mut tables.sequences.vendor);
        let record = Vendor {
            id,
            user_id: vendor.user_id,
            business_name: vendor.business_name,
            category: vendor.category,
            description: vendor.description,
            services: vendor.services,
            business_hours: vendor.business_hours,
            cover_image: vendor.cover_image,
            rating: 0,
            review_count: 0,
        };
        tables.indexes.vendor_by_user.insert(record.user_id, id);
        tables.vendors.insert(id, record.clone());

        tracing::debug!("📝 Created vendor in memory: {} (user {})", id, record.user_id);
        Ok(record)
    }

    async fn update_vendor(&self, id: VendorId, patch: VendorPatch) -> Result<Option<Vendor>> {
        let mut tables = self.tables.write().await;
        Ok(tables.vendors.get_mut(&id).map(|vendor| {
            patch.apply(vendor);
            vendor.clone()
        }))
    }

    async fn list_vendors(&self) -> Result<Vec<VendorWithUser>> {
        let tables = self.tables.read().await;
        Ok(tables
            .vendors
            .values()
            .filter_map(|vendor| Self::join_vendor(&tables, vendor))
            .collect())
    }

    async fn search_vendors(&self, query: &str) -> Result<Vec<VendorWithUser>> {
        let needle = query.to_lowercase();
        let tables = self.tables.read().await;

        let results: Vec<VendorWithUser> = tables
            .vendors
            .values()
            .filter_map(|vendor| Self::join_vendor(&tables, vendor))
            .filter(|joined| matches_query(&joined.vendor, &joined.user, &needle))
            .collect();

        tracing::debug!("🔍 Memory vendor search '{}' matched {}", query, results.len());
        Ok(results)
    }

    async fn create_service(&self, service: NewService) -> Result<Service> {
        let mut tables = self.tables.write().await;

        if !tables.vendors.contains_key(&service.vendor_id) {
            return Err(VendorHiveError::not_found("Vendor", service.vendor_id));
        }

        let id = next(&mut tables.sequences.service);
        let record = Service {
            id,
            vendor_id: service.vendor_id,
            name: service.name,
            category: service.category,
            description: service.description,
            price: service.price,
            duration: service.duration,
            location: service.location,
            image_url: service.image_url,
            time_slots: service.time_slots,
            available_dates: service.available_dates,
            availability: service.availability,
            created_at: Utc::now(),
        };
        tables.services.insert(id, record.clone());
        Ok(record)
    }

    async fn get_service(&self, id: ServiceId) -> Result<Option<Service>> {
        let tables = self.tables.read().await;
        Ok(tables.services.get(&id).cloned())
    }

    async fn list_services_by_vendor(&self, vendor_id: VendorId) -> Result<Vec<Service>> {
        let tables = self.tables.read().await;
        Ok(tables
            .services
            .values()
            .filter(|service| service.vendor_id == vendor_id)
            .cloned()
            .collect())
    }

    async fn update_service(&self, id: ServiceId, patch: ServicePatch) -> Result<Option<Service>> {
        let mut tables = self.tables.write().await;
        Ok(tables.services.get_mut(&id).map(|service| {
            patch.apply(service);
            service.clone()
        }))
    }

    async fn delete_service(&self, id: ServiceId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let deleted = tables.services.remove(&id).is_some();
        if deleted {
            tracing::debug!("🗑️ Deleted service from memory: {}", id);
        }
        Ok(deleted)
    }

    async fn create_booking(&self, booking: NewBooking) -> Result<Booking> {
        let mut tables = self.tables.write().await;

        let id = next(&mut tables.sequences.booking);
        let record = Booking {
            id,
            user_id: booking.user_id,
            vendor_id: booking.vendor_id,
            service_id: booking.service_id,
            date: booking.date,
            status: booking.status,
            notes: booking.notes,
        };
        tables.bookings.insert(id, record.clone());
        Ok(record)
    }

    async fn get_booking(&self, id: BookingId) -> Result<Option<Booking>> {
        let tables = self.tables.read().await;
        Ok(tables.bookings.get(&id).cloned())
    }

    async fn list_bookings_by_user(&self, user_id: UserId) -> Result<Vec<Booking>> {
        let tables = self.tables.read().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|booking| booking.user_id == user_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(bookings)
    }

    async fn list_bookings_by_vendor(&self, vendor_id: VendorId) -> Result<Vec<Booking>> {
        let tables = self.tables.read().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|booking| booking.vendor_id == vendor_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(bookings)
    }

    async fn update_booking_status(
        &self,
        id: BookingId,
        status: BookingStatus,
        expected: Option<BookingStatus>,
    ) -> Result<Option<Booking>> {
        let mut tables = self.tables.write().await;
        let Some(booking) = tables.bookings.get_mut(&id) else {
            return Ok(None);
        };
        if expected.is_some_and(|current| current != booking.status) {
            return Err(VendorHiveError::Conflict(
                "Booking status was changed by another request".to_string(),
            ));
        }
        booking.status = status;
        Ok(Some(booking.clone()))
    }

    async fn create_review(&self, review: NewReview) -> Result<ReviewReceipt> {
        let mut tables = self.tables.write().await;

        if !tables.vendors.contains_key(&review.vendor_id) {
            return Err(VendorHiveError::not_found("Vendor", review.vendor_id));
        }
        let duplicate = tables
            .reviews
            .values()
            .any(|r| r.vendor_id == review.vendor_id && r.user_id == review.user_id);
        if duplicate {
            return Err(VendorHiveError::Conflict(
                "You have already reviewed this vendor".to_string(),
            ));
        }

        let id = next(&mut tables.sequences.review);
        let record = Review {
            id,
            user_id: review.user_id,
            vendor_id: review.vendor_id,
            rating: review.rating,
            comment: review.comment,
            created_at: Utc::now(),
        };
        tables.reviews.insert(id, record.clone());

        let aggregate = RatingAggregate::from_ratings(
            tables
                .reviews
                .values()
                .filter(|r| r.vendor_id == record.vendor_id)
                .map(|r| r.rating),
        );
        let vendor = match tables.vendors.get_mut(&record.vendor_id) {
            Some(vendor) => {
                vendor.rating = aggregate.rounded_mean();
                vendor.review_count = aggregate.count as i32;
                vendor.clone()
            }
            None => {
                return Err(VendorHiveError::Internal(format!(
                    "vendor {} vanished during review insert",
                    record.vendor_id
                )))
            }
        };
        drop(tables);

        tracing::debug!(
            "⭐ Vendor {} aggregate now {} over {} reviews",
            vendor.id,
            vendor.rating,
            vendor.review_count
        );
        Ok(ReviewReceipt {
            review: record,
            vendor,
        })
    }

    async fn list_reviews_by_vendor(&self, vendor_id: VendorId) -> Result<Vec<ReviewWithUser>> {
        let tables = self.tables.read().await;
        let mut reviews: Vec<ReviewWithUser> = tables
            .reviews
            .values()
            .filter(|review| review.vendor_id == vendor_id)
            .filter_map(|review| {
                tables.users.get(&review.user_id).map(|user| ReviewWithUser {
                    review: review.clone(),
                    user: user.clone(),
                })
            })
            .collect();
        reviews.sort_by(|a, b| b.review.created_at.cmp(&a.review.created_at).then(b.review.id.cmp(&a.review.id)));
        Ok(reviews)
    }

    async fn close(&self) -> Result<()> {
        // Clear all data
        let mut tables = self.tables.write().await;
        *tables = MemoryTables::default();

        tracing::debug!("🛑 Memory marketplace backend closed and cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Role;
    use chrono::TimeZone;

    fn new_user(name: &str, role: Role) -> NewUser {
        NewUser {
            name: name.to_string(),
            username: name.to_lowercase(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "hash".to_string(),
            role,
            profile_image: None,
            phone: None,
            bio: None,
            location: None,
        }
    }

    fn new_vendor(user_id: UserId, business_name: &str, category: &str) -> NewVendor {
        NewVendor {
            user_id,
            business_name: business_name.to_string(),
            category: category.to_string(),
            description: "Local and reliable".to_string(),
            services: vec![],
            business_hours: None,
            cover_image: None,
        }
    }

    async fn store() -> MemoryMarketplaceStore {
        let mut store = MemoryMarketplaceStore::new();
        store.initialize().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_ids_are_sequential_per_table() {
        let store = store().await;
        let a = store.create_user(new_user("Ann", Role::User)).await.unwrap();
        let b = store.create_user(new_user("Bob", Role::Vendor)).await.unwrap();
        let vendor = store.create_vendor(new_vendor(b.id, "Bob's Bikes", "Repair")).await.unwrap();

        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(vendor.id, 1);
        assert_eq!((vendor.rating, vendor.review_count), (0, 0));
    }

    #[tokio::test]
    async fn test_duplicate_email_and_username_rejected() {
        let store = store().await;
        store.create_user(new_user("Ann", Role::User)).await.unwrap();

        let mut same_email = new_user("Other", Role::User);
        same_email.email = "ann@example.com".to_string();
        assert!(matches!(
            store.create_user(same_email).await,
            Err(VendorHiveError::Conflict(_))
        ));

        let mut same_username = new_user("Other", Role::User);
        same_username.username = "ann".to_string();
        assert!(matches!(
            store.create_user(same_username).await,
            Err(VendorHiveError::Conflict(_))
        ));

        assert_eq!(store.get_user(2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_user_moves_unique_indexes() {
        let store = store().await;
        let ann = store.create_user(new_user("Ann", Role::User)).await.unwrap();
        store.create_user(new_user("Bob", Role::User)).await.unwrap();

        let taken = UserPatch {
            email: Some("bob@example.com".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_user(ann.id, taken).await,
            Err(VendorHiveError::Conflict(_))
        ));

        let patch = UserPatch {
            email: Some("ann@new.example.com".to_string()),
            ..Default::default()
        };
        store.update_user(ann.id, patch).await.unwrap().unwrap();
        assert!(store.get_user_by_email("ann@example.com").await.unwrap().is_none());
        assert_eq!(
            store.get_user_by_email("ann@new.example.com").await.unwrap().map(|u| u.id),
            Some(ann.id)
        );
    }

    #[tokio::test]
    async fn test_search_matches_owner_name_case_insensitively() {
        let store = store().await;
        let joe = store.create_user(new_user("Joe", Role::Vendor)).await.unwrap();
        let sue = store.create_user(new_user("Sue", Role::Vendor)).await.unwrap();
        store.create_vendor(new_vendor(joe.id, "Joe's Plumbing", "Plumbing")).await.unwrap();
        store.create_vendor(new_vendor(sue.id, "Bright Sparks", "Electrical")).await.unwrap();

        let hits = store.search_vendors("PLUMB").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].vendor.business_name, "Joe's Plumbing");

        let by_owner = store.search_vendors("sue").await.unwrap();
        assert_eq!(by_owner.len(), 1);
        assert_eq!(by_owner[0].user.id, sue.id);

        assert!(store.search_vendors("carpentry").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_review_updates_aggregate_and_blocks_duplicates() {
        let store = store().await;
        let owner = store.create_user(new_user("Owner", Role::Vendor)).await.unwrap();
        let vendor = store.create_vendor(new_vendor(owner.id, "Shop", "Retail")).await.unwrap();
        let a = store.create_user(new_user("A", Role::User)).await.unwrap();
        let b = store.create_user(new_user("B", Role::User)).await.unwrap();

        let review = |user_id, rating| NewReview {
            user_id,
            vendor_id: vendor.id,
            rating,
            comment: None,
        };

        let first = store.create_review(review(a.id, 4)).await.unwrap();
        assert_eq!((first.vendor.rating, first.vendor.review_count), (4, 1));

        let second = store.create_review(review(b.id, 5)).await.unwrap();
        assert_eq!((second.vendor.rating, second.vendor.review_count), (5, 2));

        assert!(matches!(
            store.create_review(review(a.id, 1)).await,
            Err(VendorHiveError::Conflict(_))
        ));
        let stored = store.get_vendor(vendor.id).await.unwrap().unwrap();
        assert_eq!((stored.rating, stored.review_count), (5, 2));
        assert_eq!(store.list_reviews_by_vendor(vendor.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_review_for_missing_vendor_is_not_found() {
        let store = store().await;
        let result = store
            .create_review(NewReview {
                user_id: 1,
                vendor_id: 99,
                rating: 3,
                comment: None,
            })
            .await;
        assert!(matches!(result, Err(VendorHiveError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_reviews_do_not_lose_updates() {
        let store = Arc::new(store().await);
        let owner = store.create_user(new_user("Owner", Role::Vendor)).await.unwrap();
        let vendor = store.create_vendor(new_vendor(owner.id, "Shop", "Retail")).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..20 {
            let user = store.create_user(new_user(&format!("U{}", i), Role::User)).await.unwrap();
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .create_review(NewReview {
                        user_id: user.id,
                        vendor_id: vendor.id,
                        rating: if i % 2 == 0 { 5 } else { 2 },
                        comment: None,
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = store.get_vendor(vendor.id).await.unwrap().unwrap();
        assert_eq!(stored.review_count, 20);
        // (10 * 5 + 10 * 2) / 20 = 3.5, rounds half-up
        assert_eq!(stored.rating, 4);
    }

    #[tokio::test]
    async fn test_bookings_listed_newest_first_and_status_updates() {
        let store = store().await;
        let date = |day| Utc.with_ymd_and_hms(2025, 6, day, 9, 0, 0).unwrap();
        for day in [3, 1, 2] {
            store
                .create_booking(NewBooking {
                    user_id: 7,
                    vendor_id: 1,
                    service_id: None,
                    date: date(day),
                    status: BookingStatus::Pending,
                    notes: None,
                })
                .await
                .unwrap();
        }

        let listed = store.list_bookings_by_user(7).await.unwrap();
        let days: Vec<_> = listed.iter().map(|b| b.date).collect();
        assert_eq!(days, vec![date(3), date(2), date(1)]);

        let updated = store
            .update_booking_status(1, BookingStatus::Confirmed, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Confirmed);
        assert!(store
            .update_booking_status(42, BookingStatus::Cancelled, None)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_status_update_with_stale_expectation_is_refused() {
        let store = store().await;
        store
            .create_booking(NewBooking {
                user_id: 7,
                vendor_id: 1,
                service_id: None,
                date: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
                status: BookingStatus::Pending,
                notes: None,
            })
            .await
            .unwrap();

        store
            .update_booking_status(1, BookingStatus::Confirmed, Some(BookingStatus::Pending))
            .await
            .unwrap()
            .unwrap();

        // A second writer that also read "pending" loses
        let stale = store
            .update_booking_status(1, BookingStatus::Cancelled, Some(BookingStatus::Pending))
            .await;
        assert!(matches!(stale, Err(VendorHiveError::Conflict(_))));
        let stored = store.get_booking(1).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_delete_user_releases_email_and_username() {
        let store = store().await;
        let user = store.create_user(new_user("Ann", Role::User)).await.unwrap();

        assert!(store.delete_user(user.id).await.unwrap());
        assert!(store.get_user(user.id).await.unwrap().is_none());
        assert!(!store.delete_user(user.id).await.unwrap());

        let again = store.create_user(new_user("Ann", Role::User)).await.unwrap();
        assert_ne!(again.id, user.id);
    }

    #[tokio::test]
    async fn test_delete_service() {
        let store = store().await;
        let owner = store.create_user(new_user("Owner", Role::Vendor)).await.unwrap();
        let vendor = store.create_vendor(new_vendor(owner.id, "Shop", "Retail")).await.unwrap();
        let service = store
            .create_service(NewService {
                vendor_id: vendor.id,
                name: "Tune-up".to_string(),
                category: "Repair".to_string(),
                description: "Full service".to_string(),
                price: "$40".to_string(),
                duration: None,
                location: None,
                image_url: None,
                time_slots: vec![],
                available_dates: vec![],
                availability: true,
            })
            .await
            .unwrap();

        assert!(store.delete_service(service.id).await.unwrap());
        assert!(store.get_service(service.id).await.unwrap().is_none());
        assert!(!store.delete_service(service.id).await.unwrap());
    }
}
