// Copyright 2025 Vijaykumar Singh
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! MongoDB Marketplace Backend
//!
//! Document-store backend for deployments. One MongoDB collection per record
//! type, numeric ids stored as `_id` and allocated from a `counters`
//! collection. Unique indexes back the email/username and one-review-per-vendor
//! rules, and the vendor rating aggregate is folded in with a single
//! pipeline update so concurrent reviews cannot lose each other.

use anyhow::Context;
use async_trait::async_trait;
use bson::{doc, Bson, Document};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{
    ClientOptions, FindOneAndUpdateOptions, FindOneOptions, FindOptions, IndexOptions,
    ReturnDocument, UpdateModifications, UpdateOptions,
};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use super::{undo_on_error, MarketplaceStore};
use crate::core::{
    Booking, BookingId, BookingStatus, NewBooking, NewReview, NewService, NewUser, NewVendor,
    RatingAggregate, Result, Review, ReviewReceipt, ReviewWithUser, Role, Service, ServiceId, ServicePatch,
    StorageConfig, TimeSlot, User, UserId, UserPatch, Vendor, VendorHiveError, VendorId,
    VendorPatch, VendorWithUser,
};

const USERS: &str = "users";
const VENDORS: &str = "vendors";
const SERVICES: &str = "services";
const BOOKINGS: &str = "bookings";
const REVIEWS: &str = "reviews";
const COUNTERS: &str = "counters";

/// Server error code for unique index violations
const DUPLICATE_KEY: i32 = 11000;

/// MongoDB marketplace backend using the official driver
pub struct MongoMarketplaceStore {
    /// Connection settings
    config: StorageConfig,

    /// Set by `initialize`
    database: Option<Database>,
}

// ---------------------------------------------------------------------------
// Stored documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDocument {
    #[serde(rename = "_id")]
    id: i64,
    name: String,
    username: String,
    email: String,
    password: String,
    role: Role,
    profile_image: Option<String>,
    phone: Option<String>,
    bio: Option<String>,
    location: Option<String>,
    joined_at: bson::DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VendorDocument {
    #[serde(rename = "_id")]
    id: i64,
    user_id: i64,
    business_name: String,
    category: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    services: Vec<String>,
    business_hours: Option<serde_json::Value>,
    cover_image: Option<String>,
    #[serde(default)]
    rating: i32,
    #[serde(default)]
    review_count: i32,
    /// Sum of all ratings; the mean is derived from it
    #[serde(default)]
    rating_total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceDocument {
    #[serde(rename = "_id")]
    id: i64,
    vendor_id: i64,
    name: String,
    category: String,
    #[serde(default)]
    description: String,
    price: String,
    duration: Option<String>,
    location: Option<String>,
    image_url: Option<String>,
    #[serde(default)]
    time_slots: Vec<TimeSlot>,
    #[serde(default)]
    available_dates: Vec<bson::DateTime>,
    availability: bool,
    created_at: bson::DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingDocument {
    #[serde(rename = "_id")]
    id: i64,
    user_id: i64,
    vendor_id: i64,
    service_id: Option<i64>,
    date: bson::DateTime,
    status: BookingStatus,
    notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewDocument {
    #[serde(rename = "_id")]
    id: i64,
    user_id: i64,
    vendor_id: i64,
    rating: i32,
    comment: Option<String>,
    created_at: bson::DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CounterDocument {
    #[serde(rename = "_id")]
    id: String,
    seq: i64,
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        User {
            id: doc.id,
            name: doc.name,
            username: doc.username,
            email: doc.email,
            password: doc.password,
            role: doc.role,
            profile_image: doc.profile_image,
            phone: doc.phone,
            bio: doc.bio,
            location: doc.location,
            joined_at: doc.joined_at.to_chrono(),
        }
    }
}

impl From<VendorDocument> for Vendor {
    fn from(doc: VendorDocument) -> Self {
        Vendor {
            id: doc.id,
            user_id: doc.user_id,
            business_name: doc.business_name,
            category: doc.category,
            description: doc.description,
            services: doc.services,
            business_hours: doc.business_hours,
            cover_image: doc.cover_image,
            rating: doc.rating,
            review_count: doc.review_count,
        }
    }
}

impl From<ServiceDocument> for Service {
    fn from(doc: ServiceDocument) -> Self {
        Service {
            id: doc.id,
            vendor_id: doc.vendor_id,
            name: doc.name,
            category: doc.category,
            description: doc.description,
            price: doc.price,
            duration: doc.duration,
            location: doc.location,
            image_url: doc.image_url,
            time_slots: doc.time_slots,
            available_dates: doc.available_dates.into_iter().map(|d| d.to_chrono()).collect(),
            availability: doc.availability,
            created_at: doc.created_at.to_chrono(),
        }
    }
}

impl From<BookingDocument> for Booking {
    fn from(doc: BookingDocument) -> Self {
        Booking {
            id: doc.id,
            user_id: doc.user_id,
            vendor_id: doc.vendor_id,
            service_id: doc.service_id,
            date: doc.date.to_chrono(),
            status: doc.status,
            notes: doc.notes,
        }
    }
}

impl From<ReviewDocument> for Review {
    fn from(doc: ReviewDocument) -> Self {
        Review {
            id: doc.id,
            user_id: doc.user_id,
            vendor_id: doc.vendor_id,
            rating: doc.rating,
            comment: doc.comment,
            created_at: doc.created_at.to_chrono(),
        }
    }
}

/// True when the driver reports a unique index violation
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == DUPLICATE_KEY,
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY,
        _ => false,
    }
}

/// Case-insensitive literal substring filter value
fn contains_regex(query: &str) -> bson::Regex {
    bson::Regex {
        pattern: regex::escape(query),
        options: "i".to_string(),
    }
}

fn optional_string(set: &mut Document, field: &str, value: Option<String>) {
    if let Some(value) = value {
        set.insert(field, value);
    }
}

fn user_patch_document(patch: UserPatch) -> Document {
    let mut set = Document::new();
    optional_string(&mut set, "name", patch.name);
    optional_string(&mut set, "username", patch.username);
    optional_string(&mut set, "email", patch.email);
    optional_string(&mut set, "password", patch.password_hash);
    optional_string(&mut set, "profileImage", patch.profile_image);
    optional_string(&mut set, "phone", patch.phone);
    optional_string(&mut set, "bio", patch.bio);
    optional_string(&mut set, "location", patch.location);
    set
}

fn vendor_patch_document(patch: VendorPatch) -> Result<Document> {
    let mut set = Document::new();
    optional_string(&mut set, "businessName", patch.business_name);
    optional_string(&mut set, "category", patch.category);
    optional_string(&mut set, "description", patch.description);
    if let Some(services) = patch.services {
        set.insert("services", services);
    }
    if let Some(hours) = patch.business_hours {
        set.insert(
            "businessHours",
            bson::to_bson(&hours).context("Failed to encode business hours")?,
        );
    }
    optional_string(&mut set, "coverImage", patch.cover_image);
    Ok(set)
}

fn service_patch_document(patch: ServicePatch) -> Result<Document> {
    let mut set = Document::new();
    optional_string(&mut set, "name", patch.name);
    optional_string(&mut set, "category", patch.category);
    optional_string(&mut set, "description", patch.description);
    optional_string(&mut set, "price", patch.price);
    optional_string(&mut set, "duration", patch.duration);
    optional_string(&mut set, "location", patch.location);
    optional_string(&mut set, "imageUrl", patch.image_url);
    if let Some(slots) = patch.time_slots {
        set.insert(
            "timeSlots",
            bson::to_bson(&slots).context("Failed to encode time slots")?,
        );
    }
    if let Some(dates) = patch.available_dates {
        let dates: Vec<Bson> = dates
            .into_iter()
            .map(|d| Bson::DateTime(bson::DateTime::from_chrono(d)))
            .collect();
        set.insert("availableDates", dates);
    }
    if let Some(availability) = patch.availability {
        set.insert("availability", availability);
    }
    Ok(set)
}

/// Pipeline that folds one rating into the stored total/count and recomputes
/// the rounded mean from them
fn rating_pipeline(rating: i32) -> Vec<Document> {
    let rating = i64::from(rating);
    vec![
        doc! {
            "$set": {
                "reviewCount": { "$add": [{ "$ifNull": ["$reviewCount", 0] }, 1] },
                "ratingTotal": { "$add": [{ "$ifNull": ["$ratingTotal", 0_i64] }, rating] },
            }
        },
        doc! {
            "$set": {
                "rating": {
                    "$toInt": {
                        "$floor": {
                            "$add": [{ "$divide": ["$ratingTotal", "$reviewCount"] }, 0.5]
                        }
                    }
                }
            }
        },
    ]
}

/// Numeric value of an Int32 or Int64 field
fn bson_integer(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int64(v) => Some(*v),
        Bson::Int32(v) => Some(i64::from(*v)),
        _ => None,
    }
}

fn after_update() -> FindOneAndUpdateOptions {
    FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build()
}

impl MongoMarketplaceStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            database: None,
        }
    }

    fn database(&self) -> Result<&Database> {
        self.database
            .as_ref()
            .ok_or_else(|| VendorHiveError::Internal("MongoDB backend not initialized".to_string()))
    }

    fn users(&self) -> Result<Collection<UserDocument>> {
        Ok(self.database()?.collection(USERS))
    }

    fn vendors(&self) -> Result<Collection<VendorDocument>> {
        Ok(self.database()?.collection(VENDORS))
    }

    fn services(&self) -> Result<Collection<ServiceDocument>> {
        Ok(self.database()?.collection(SERVICES))
    }

    fn bookings(&self) -> Result<Collection<BookingDocument>> {
        Ok(self.database()?.collection(BOOKINGS))
    }

    fn reviews(&self) -> Result<Collection<ReviewDocument>> {
        Ok(self.database()?.collection(REVIEWS))
    }

    fn counters(&self) -> Result<Collection<CounterDocument>> {
        Ok(self.database()?.collection(COUNTERS))
    }

    /// Allocate the next id for a record type
    async fn next_id(&self, entity: &str) -> Result<i64> {
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();
        let counter = self
            .counters()?
            .find_one_and_update(doc! { "_id": entity }, doc! { "$inc": { "seq": 1_i64 } }, options)
            .await
            .with_context(|| format!("Failed to allocate {} id", entity))?;

        counter
            .map(|c| c.seq)
            .ok_or_else(|| VendorHiveError::Internal(format!("id counter for {} missing", entity)))
    }

    /// Raise each counter to at least the largest stored id so records written
    /// before counters existed are never shadowed
    async fn seed_counters(&self) -> Result<()> {
        let db = self.database()?;
        let newest_first = FindOneOptions::builder()
            .sort(doc! { "_id": -1 })
            .projection(doc! { "_id": 1 })
            .build();

        for entity in [USERS, VENDORS, SERVICES, BOOKINGS, REVIEWS] {
            let newest = db
                .collection::<Document>(entity)
                .find_one(doc! {}, newest_first.clone())
                .await
                .with_context(|| format!("Failed to read highest {} id", entity))?;
            let max_id = newest
                .as_ref()
                .and_then(|d| d.get("_id").and_then(bson_integer))
                .unwrap_or(0);

            self.counters()?
                .update_one(
                    doc! { "_id": entity },
                    doc! { "$max": { "seq": max_id } },
                    UpdateOptions::builder().upsert(true).build(),
                )
                .await
                .with_context(|| format!("Failed to seed {} counter", entity))?;
            tracing::debug!("🔢 Counter '{}' seeded at {}", entity, max_id);
        }
        Ok(())
    }

    /// Create the indexes the uniqueness rules and list queries rely on
    async fn setup_indexes(&self) -> Result<()> {
        let unique = || IndexOptions::builder().unique(true).build();

        self.users()?
            .create_indexes(
                [
                    IndexModel::builder().keys(doc! { "email": 1 }).options(unique()).build(),
                    IndexModel::builder().keys(doc! { "username": 1 }).options(unique()).build(),
                ],
                None,
            )
            .await
            .context("Failed to create user indexes")?;

        self.vendors()?
            .create_index(
                IndexModel::builder().keys(doc! { "userId": 1 }).options(unique()).build(),
                None,
            )
            .await
            .context("Failed to create vendor indexes")?;

        self.services()?
            .create_index(IndexModel::builder().keys(doc! { "vendorId": 1 }).build(), None)
            .await
            .context("Failed to create service indexes")?;

        self.bookings()?
            .create_indexes(
                [
                    IndexModel::builder().keys(doc! { "userId": 1, "date": -1 }).build(),
                    IndexModel::builder().keys(doc! { "vendorId": 1, "date": -1 }).build(),
                ],
                None,
            )
            .await
            .context("Failed to create booking indexes")?;

        self.reviews()?
            .create_indexes(
                [
                    IndexModel::builder()
                        .keys(doc! { "userId": 1, "vendorId": 1 })
                        .options(unique())
                        .build(),
                    IndexModel::builder().keys(doc! { "vendorId": 1, "createdAt": -1 }).build(),
                ],
                None,
            )
            .await
            .context("Failed to create review indexes")?;

        tracing::debug!("📋 MongoDB indexes ensured");
        Ok(())
    }

    /// Add one review's rating to its vendor's aggregate
    async fn fold_rating(
        &self,
        vendors: &Collection<VendorDocument>,
        review: &ReviewDocument,
    ) -> Result<VendorDocument> {
        vendors
            .find_one_and_update(
                doc! { "_id": review.vendor_id },
                UpdateModifications::Pipeline(rating_pipeline(review.rating)),
                after_update(),
            )
            .await
            .context("Failed to update vendor rating")?
            .ok_or_else(|| {
                VendorHiveError::Internal(format!(
                    "vendor {} vanished during review insert",
                    review.vendor_id
                ))
            })
    }

    /// Rebuild the aggregate of vendors stored without `ratingTotal`
    ///
    /// The rating pipeline derives the mean from the running total, so a
    /// missing total would be read as zero on the next review.
    async fn backfill_rating_totals(&self) -> Result<()> {
        let vendors = self.vendors()?;
        let legacy = doc! { "ratingTotal": { "$exists": false } };
        let pending = vendors
            .count_documents(legacy.clone(), None)
            .await
            .context("Failed to count vendors without rating totals")?;
        if pending == 0 {
            return Ok(());
        }

        let totals: Vec<Document> = self
            .database()?
            .collection::<Document>(REVIEWS)
            .aggregate(
                [doc! {
                    "$group": {
                        "_id": "$vendorId",
                        "total": { "$sum": { "$toLong": "$rating" } },
                        "count": { "$sum": 1 },
                    }
                }],
                None,
            )
            .await
            .context("Failed to aggregate review ratings")?
            .try_collect()
            .await
            .context("Failed to read review ratings")?;

        for group in totals {
            let (Some(vendor_id), Some(total), Some(count)) = (
                group.get("_id").and_then(bson_integer),
                group.get("total").and_then(bson_integer),
                group.get("count").and_then(bson_integer),
            ) else {
                continue;
            };
            let rating = RatingAggregate { total, count }.rounded_mean();
            let review_count = count as i32;
            let mut filter = legacy.clone();
            filter.insert("_id", vendor_id);
            vendors
                .update_one(
                    filter,
                    doc! { "$set": {
                        "ratingTotal": total,
                        "reviewCount": review_count,
                        "rating": rating,
                    } },
                    None,
                )
                .await
                .context("Failed to backfill vendor rating")?;
        }

        // Whatever is left has no reviews at all
        vendors
            .update_many(
                legacy,
                doc! { "$set": { "ratingTotal": 0_i64, "reviewCount": 0, "rating": 0 } },
                None,
            )
            .await
            .context("Failed to reset empty vendor ratings")?;

        tracing::info!("⭐ Backfilled rating totals for {} vendors", pending);
        Ok(())
    }

    /// Attach owning users to vendor documents, dropping orphans
    async fn join_users(&self, vendors: Vec<VendorDocument>) -> Result<Vec<VendorWithUser>> {
        let owner_ids: Vec<i64> = vendors.iter().map(|v| v.user_id).collect();
        let owners = self.users_by_id(owner_ids).await?;

        Ok(vendors
            .into_iter()
            .filter_map(|vendor| {
                owners.get(&vendor.user_id).cloned().map(|user| VendorWithUser {
                    vendor: vendor.into(),
                    user,
                })
            })
            .collect())
    }

    async fn users_by_id(&self, ids: Vec<i64>) -> Result<HashMap<UserId, User>> {
        let users: Vec<UserDocument> = self
            .users()?
            .find(doc! { "_id": { "$in": ids } }, None)
            .await
            .context("Failed to query users")?
            .try_collect()
            .await
            .context("Failed to read users")?;

        Ok(users.into_iter().map(|u| (u.id, User::from(u))).collect())
    }

    async fn email_taken_by_other(&self, email: &str, id: UserId) -> Result<bool> {
        let owner = self
            .users()?
            .find_one(doc! { "email": email, "_id": { "$ne": id } }, None)
            .await
            .context("Failed to check email")?;
        Ok(owner.is_some())
    }

    async fn username_taken_by_other(&self, username: &str, id: UserId) -> Result<bool> {
        let owner = self
            .users()?
            .find_one(doc! { "username": username, "_id": { "$ne": id } }, None)
            .await
            .context("Failed to check username")?;
        Ok(owner.is_some())
    }

    async fn list_bookings(&self, filter: Document) -> Result<Vec<Booking>> {
        let newest_first = FindOptions::builder().sort(doc! { "date": -1, "_id": -1 }).build();
        let bookings: Vec<BookingDocument> = self
            .bookings()?
            .find(filter, newest_first)
            .await
            .context("Failed to query bookings")?
            .try_collect()
            .await
            .context("Failed to read bookings")?;

        Ok(bookings.into_iter().map(Booking::from).collect())
    }
}

#[async_trait]
impl MarketplaceStore for MongoMarketplaceStore {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    async fn initialize(&mut self) -> Result<()> {
        tracing::info!("🚀 Initializing MongoDB marketplace backend");

        let uri = self.config.mongodb_uri.clone().ok_or_else(|| {
            VendorHiveError::Config(crate::core::ConfigError::MissingField {
                field: "storage.mongodb_uri".to_string(),
            })
        })?;

        let mut options = ClientOptions::parse(&uri)
            .await
            .context("Invalid MongoDB connection string")?;
        let timeout = Duration::from_secs(self.config.connect_timeout_secs);
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        options.app_name = Some("vendorhive".to_string());

        let client = Client::with_options(options).context("Failed to create MongoDB client")?;
        let database = client.database(&self.config.database);

        database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .context("MongoDB did not answer ping")?;

        self.database = Some(database);

        self.setup_indexes().await?;
        self.seed_counters().await?;
        self.backfill_rating_totals().await?;

        tracing::info!(
            "✅ MongoDB marketplace backend initialized with database: {}",
            self.config.database
        );
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        let Ok(db) = self.database() else {
            return Ok(false);
        };
        match db.run_command(doc! { "ping": 1 }, None).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("❤️ MongoDB health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let user = self
            .users()?
            .find_one(doc! { "_id": id }, None)
            .await
            .context("Failed to load user")?;
        Ok(user.map(User::from))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .users()?
            .find_one(doc! { "email": email }, None)
            .await
            .context("Failed to load user by email")?;
        Ok(user.map(User::from))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = self
            .users()?
            .find_one(doc! { "username": username }, None)
            .await
            .context("Failed to load user by username")?;
        Ok(user.map(User::from))
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let users = self.users()?;
        if users
            .find_one(doc! { "email": user.email.as_str() }, None)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(VendorHiveError::Conflict("Email already in use".to_string()));
        }
        if users
            .find_one(doc! { "username": user.username.as_str() }, None)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(VendorHiveError::Conflict("Username already taken".to_string()));
        }

        let document = UserDocument {
            id: self.next_id(USERS).await?,
            name: user.name,
            username: user.username,
            email: user.email,
            password: user.password_hash,
            role: user.role,
            profile_image: user.profile_image,
            phone: user.phone,
            bio: user.bio,
            location: user.location,
            joined_at: bson::DateTime::now(),
        };

        match users.insert_one(&document, None).await {
            Ok(_) => {}
            // Lost a race against a concurrent registration
            Err(e) if is_duplicate_key(&e) => {
                return Err(VendorHiveError::Conflict(
                    "Email or username already in use".to_string(),
                ))
            }
            Err(e) => return Err(anyhow::Error::new(e).context("Failed to insert user").into()),
        }

        tracing::debug!("📝 Created user in MongoDB: {}", document.id);
        Ok(document.into())
    }

    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<Option<User>> {
        if let Some(email) = &patch.email {
            if self.email_taken_by_other(email, id).await? {
                return Err(VendorHiveError::Conflict("Email already in use".to_string()));
            }
        }
        if let Some(username) = &patch.username {
            if self.username_taken_by_other(username, id).await? {
                return Err(VendorHiveError::Conflict("Username already taken".to_string()));
            }
        }

        let set = user_patch_document(patch);
        let users = self.users()?;
        let updated = if set.is_empty() {
            users.find_one(doc! { "_id": id }, None).await.context("Failed to load user")?
        } else {
            match users
                .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, after_update())
                .await
            {
                Ok(updated) => updated,
                Err(e) if is_duplicate_key(&e) => {
                    return Err(VendorHiveError::Conflict(
                        "Email or username already in use".to_string(),
                    ))
                }
                Err(e) => {
                    return Err(anyhow::Error::new(e).context("Failed to update user").into())
                }
            }
        };

        Ok(updated.map(User::from))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        let result = self
            .users()?
            .delete_one(doc! { "_id": id }, None)
            .await
            .context("Failed to delete user")?;
        Ok(result.deleted_count > 0)
    }

    async fn get_vendor(&self, id: VendorId) -> Result<Option<Vendor>> {
        let vendor = self
            .vendors()?
            .find_one(doc! { "_id": id }, None)
            .await
            .context("Failed to load vendor")?;
        Ok(vendor.map(Vendor::from))
    }

    async fn get_vendor_by_user_id(&self, user_id: UserId) -> Result<Option<Vendor>> {
        let vendor = self
            .vendors()?
            .find_one(doc! { "userId": user_id }, None)
            .await
            .context("Failed to load vendor by user")?;
        Ok(vendor.map(Vendor::from))
    }

    async fn create_vendor(&self, vendor: NewVendor) -> Result<Vendor> {
        if self
            .users()?
            .find_one(doc! { "_id": vendor.user_id }, None)
            .await
            .context("Failed to check vendor owner")?
            .is_none()
        {
            return Err(VendorHiveError::not_found("User", vendor.user_id));
        }

        let document = VendorDocument {
            id: self.next_id(VENDORS).await?,
            user_id: vendor.user_id,
            business_name: vendor.business_name,
            category: vendor.category,
            description: vendor.description,
            services: vendor.services,
            business_hours: vendor.business_hours,
            cover_image: vendor.cover_image,
            rating: 0,
            review_count: 0,
            rating_total: 0,
        };

        match self.vendors()?.insert_one(&document, None).await {
            Ok(_) => {}
            Err(e) if is_duplicate_key(&e) => {
                return Err(VendorHiveError::Conflict(
                    "Vendor profile already exists for this user".to_string(),
                ))
            }
            Err(e) => {
                return Err(anyhow::Error::new(e).context("Failed to insert vendor").into())
            }
        }

        tracing::debug!("📝 Created vendor in MongoDB: {} (user {})", document.id, document.user_id);
        Ok(document.into())
    }

    async fn update_vendor(&self, id: VendorId, patch: VendorPatch) -> Result<Option<Vendor>> {
        let set = vendor_patch_document(patch)?;
        let vendors = self.vendors()?;
        let updated = if set.is_empty() {
            vendors.find_one(doc! { "_id": id }, None).await.context("Failed to load vendor")?
        } else {
            vendors
                .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, after_update())
                .await
                .context("Failed to update vendor")?
        };
        Ok(updated.map(Vendor::from))
    }

    async fn list_vendors(&self) -> Result<Vec<VendorWithUser>> {
        let by_id = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let vendors: Vec<VendorDocument> = self
            .vendors()?
            .find(doc! {}, by_id)
            .await
            .context("Failed to query vendors")?
            .try_collect()
            .await
            .context("Failed to read vendors")?;

        tracing::debug!("📋 Listed {} vendors from MongoDB", vendors.len());
        self.join_users(vendors).await
    }

    async fn search_vendors(&self, query: &str) -> Result<Vec<VendorWithUser>> {
        let pattern = contains_regex(query);

        let matching_owners: Vec<UserDocument> = self
            .users()?
            .find(doc! { "name": pattern.clone() }, None)
            .await
            .context("Failed to search users")?
            .try_collect()
            .await
            .context("Failed to read users")?;
        let owner_ids: Vec<i64> = matching_owners.iter().map(|u| u.id).collect();

        let filter = doc! {
            "$or": [
                { "businessName": pattern.clone() },
                { "category": pattern.clone() },
                { "description": pattern },
                { "userId": { "$in": owner_ids } },
            ]
        };
        let by_id = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let vendors: Vec<VendorDocument> = self
            .vendors()?
            .find(filter, by_id)
            .await
            .context("Failed to search vendors")?
            .try_collect()
            .await
            .context("Failed to read vendors")?;

        tracing::debug!("🔍 MongoDB vendor search '{}' matched {}", query, vendors.len());
        self.join_users(vendors).await
    }

    async fn create_service(&self, service: NewService) -> Result<Service> {
        if self
            .vendors()?
            .find_one(doc! { "_id": service.vendor_id }, None)
            .await
            .context("Failed to check service vendor")?
            .is_none()
        {
            return Err(VendorHiveError::not_found("Vendor", service.vendor_id));
        }

        let document = ServiceDocument {
            id: self.next_id(SERVICES).await?,
            vendor_id: service.vendor_id,
            name: service.name,
            category: service.category,
            description: service.description,
            price: service.price,
            duration: service.duration,
            location: service.location,
            image_url: service.image_url,
            time_slots: service.time_slots,
            available_dates: service
                .available_dates
                .into_iter()
                .map(bson::DateTime::from_chrono)
                .collect(),
            availability: service.availability,
            created_at: bson::DateTime::from_chrono(Utc::now()),
        };

        self.services()?
            .insert_one(&document, None)
            .await
            .context("Failed to insert service")?;
        Ok(document.into())
    }

    async fn get_service(&self, id: ServiceId) -> Result<Option<Service>> {
        let service = self
            .services()?
            .find_one(doc! { "_id": id }, None)
            .await
            .context("Failed to load service")?;
        Ok(service.map(Service::from))
    }

    async fn list_services_by_vendor(&self, vendor_id: VendorId) -> Result<Vec<Service>> {
        let by_id = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let services: Vec<ServiceDocument> = self
            .services()?
            .find(doc! { "vendorId": vendor_id }, by_id)
            .await
            .context("Failed to query services")?
            .try_collect()
            .await
            .context("Failed to read services")?;
        Ok(services.into_iter().map(Service::from).collect())
    }

    async fn update_service(&self, id: ServiceId, patch: ServicePatch) -> Result<Option<Service>> {
        let set = service_patch_document(patch)?;
        let services = self.services()?;
        let updated = if set.is_empty() {
            services.find_one(doc! { "_id": id }, None).await.context("Failed to load service")?
        } else {
            services
                .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, after_update())
                .await
                .context("Failed to update service")?
        };
        Ok(updated.map(Service::from))
    }

    async fn delete_service(&self, id: ServiceId) -> Result<bool> {
        let result = self
            .services()?
            .delete_one(doc! { "_id": id }, None)
            .await
            .context("Failed to delete service")?;
        let deleted = result.deleted_count > 0;
        if deleted {
            tracing::debug!("🗑️ Deleted service from MongoDB: {}", id);
        }
        Ok(deleted)
    }

    async fn create_booking(&self, booking: NewBooking) -> Result<Booking> {
        let document = BookingDocument {
            id: self.next_id(BOOKINGS).await?,
            user_id: booking.user_id,
            vendor_id: booking.vendor_id,
            service_id: booking.service_id,
            date: bson::DateTime::from_chrono(booking.date),
            status: booking.status,
            notes: booking.notes,
        };

        self.bookings()?
            .insert_one(&document, None)
            .await
            .context("Failed to insert booking")?;
        Ok(document.into())
    }

    async fn get_booking(&self, id: BookingId) -> Result<Option<Booking>> {
        let booking = self
            .bookings()?
            .find_one(doc! { "_id": id }, None)
            .await
            .context("Failed to load booking")?;
        Ok(booking.map(Booking::from))
    }

    async fn list_bookings_by_user(&self, user_id: UserId) -> Result<Vec<Booking>> {
        self.list_bookings(doc! { "userId": user_id }).await
    }

    async fn list_bookings_by_vendor(&self, vendor_id: VendorId) -> Result<Vec<Booking>> {
        self.list_bookings(doc! { "vendorId": vendor_id }).await
    }

    async fn update_booking_status(
        &self,
        id: BookingId,
        status: BookingStatus,
        expected: Option<BookingStatus>,
    ) -> Result<Option<Booking>> {
        let bookings = self.bookings()?;
        let mut filter = doc! { "_id": id };
        if let Some(current) = expected {
            filter.insert("status", current.as_str());
        }

        let updated = bookings
            .find_one_and_update(
                filter,
                doc! { "$set": { "status": status.as_str() } },
                after_update(),
            )
            .await
            .context("Failed to update booking status")?;
        if updated.is_some() || expected.is_none() {
            return Ok(updated.map(Booking::from));
        }

        // The filter missed: either the booking is gone or its status moved on
        let exists = bookings
            .find_one(doc! { "_id": id }, None)
            .await
            .context("Failed to reload booking")?
            .is_some();
        if exists {
            Err(VendorHiveError::Conflict(
                "Booking status was changed by another request".to_string(),
            ))
        } else {
            Ok(None)
        }
    }

    async fn create_review(&self, review: NewReview) -> Result<ReviewReceipt> {
        let vendors = self.vendors()?;
        if vendors
            .find_one(doc! { "_id": review.vendor_id }, None)
            .await
            .context("Failed to check reviewed vendor")?
            .is_none()
        {
            return Err(VendorHiveError::not_found("Vendor", review.vendor_id));
        }

        let document = ReviewDocument {
            id: self.next_id(REVIEWS).await?,
            user_id: review.user_id,
            vendor_id: review.vendor_id,
            rating: review.rating,
            comment: review.comment,
            created_at: bson::DateTime::from_chrono(Utc::now()),
        };

        match self.reviews()?.insert_one(&document, None).await {
            Ok(_) => {}
            Err(e) if is_duplicate_key(&e) => {
                return Err(VendorHiveError::Conflict(
                    "You have already reviewed this vendor".to_string(),
                ))
            }
            Err(e) => {
                return Err(anyhow::Error::new(e).context("Failed to insert review").into())
            }
        }

        let folded = self.fold_rating(&vendors, &document).await;
        let vendor = undo_on_error(folded, || async {
            tracing::warn!("↩️ Removing review {} after failed rating update", document.id);
            self.reviews()?
                .delete_one(doc! { "_id": document.id }, None)
                .await
                .context("Failed to remove review")?;
            Ok::<_, VendorHiveError>(())
        })
        .await?;

        tracing::debug!(
            "⭐ Vendor {} aggregate now {} over {} reviews",
            vendor.id,
            vendor.rating,
            vendor.review_count
        );
        Ok(ReviewReceipt {
            review: document.into(),
            vendor: vendor.into(),
        })
    }

    async fn list_reviews_by_vendor(&self, vendor_id: VendorId) -> Result<Vec<ReviewWithUser>> {
        let newest_first = FindOptions::builder()
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .build();
        let reviews: Vec<ReviewDocument> = self
            .reviews()?
            .find(doc! { "vendorId": vendor_id }, newest_first)
            .await
            .context("Failed to query reviews")?
            .try_collect()
            .await
            .context("Failed to read reviews")?;

        let authors = self
            .users_by_id(reviews.iter().map(|r| r.user_id).collect())
            .await?;

        Ok(reviews
            .into_iter()
            .filter_map(|review| {
                authors.get(&review.user_id).cloned().map(|user| ReviewWithUser {
                    review: review.into(),
                    user,
                })
            })
            .collect())
    }

    async fn close(&self) -> Result<()> {
        // The driver tears its pool down when the last client handle drops
        tracing::debug!("🛑 MongoDB marketplace backend closed");
        Ok(())
    }
}
