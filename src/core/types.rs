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

//! Marketplace domain records
//!
//! Every record is keyed by a positive integer id allocated by the storage
//! backend. Wire names are camelCase to match the JSON API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type UserId = i64;
pub type VendorId = i64;
pub type ServiceId = i64;
pub type BookingId = i64;
pub type ReviewId = i64;

/// Account role; gates vendor-only operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Vendor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Vendor => "vendor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "vendor" => Ok(Role::Vendor),
            other => Err(format!("Invalid role '{}', expected 'user' or 'vendor'", other)),
        }
    }
}

/// Booking lifecycle state
///
/// `pending` is initial; `pending -> confirmed | cancelled`,
/// `confirmed -> completed | cancelled`. Whether the lifecycle is enforced on
/// update is a deployment setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Transition table used when lifecycle enforcement is switched on.
    /// Re-submitting the current state is always accepted.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| "Invalid status".to_string())
    }
}

/// Registered account. The password field only ever holds a hash and is never
/// serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub role: Role,
    pub profile_image: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub joined_at: DateTime<Utc>,
}

/// Business profile owned by a vendor-role user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: VendorId,
    pub user_id: UserId,
    pub business_name: String,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub services: Vec<String>,
    pub business_hours: Option<serde_json::Value>,
    pub cover_image: Option<String>,
    /// Rounded mean of all review ratings, 0 without reviews
    pub rating: i32,
    pub review_count: i32,
}

/// Descriptive availability window; nothing schedules against it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: ServiceId,
    pub vendor_id: VendorId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub price: String,
    pub duration: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    #[serde(default)]
    pub available_dates: Vec<DateTime<Utc>>,
    pub availability: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub vendor_id: VendorId,
    pub service_id: Option<ServiceId>,
    pub date: DateTime<Utc>,
    pub status: BookingStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub vendor_id: VendorId,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Inputs accepted by the storage layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub profile_image: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub profile_image: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

impl UserPatch {
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(hash) = self.password_hash {
            user.password = hash;
        }
        if self.profile_image.is_some() {
            user.profile_image = self.profile_image;
        }
        if self.phone.is_some() {
            user.phone = self.phone;
        }
        if self.bio.is_some() {
            user.bio = self.bio;
        }
        if self.location.is_some() {
            user.location = self.location;
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewVendor {
    pub user_id: UserId,
    pub business_name: String,
    pub category: String,
    pub description: String,
    pub services: Vec<String>,
    pub business_hours: Option<serde_json::Value>,
    pub cover_image: Option<String>,
}

/// Editable vendor fields; the rating aggregate is deliberately absent
#[derive(Debug, Clone, Default)]
pub struct VendorPatch {
    pub business_name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub services: Option<Vec<String>>,
    pub business_hours: Option<serde_json::Value>,
    pub cover_image: Option<String>,
}

impl VendorPatch {
    pub fn apply(self, vendor: &mut Vendor) {
        if let Some(business_name) = self.business_name {
            vendor.business_name = business_name;
        }
        if let Some(category) = self.category {
            vendor.category = category;
        }
        if let Some(description) = self.description {
            vendor.description = description;
        }
        if let Some(services) = self.services {
            vendor.services = services;
        }
        if self.business_hours.is_some() {
            vendor.business_hours = self.business_hours;
        }
        if self.cover_image.is_some() {
            vendor.cover_image = self.cover_image;
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewService {
    pub vendor_id: VendorId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub price: String,
    pub duration: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub time_slots: Vec<TimeSlot>,
    pub available_dates: Vec<DateTime<Utc>>,
    pub availability: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ServicePatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub duration: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub time_slots: Option<Vec<TimeSlot>>,
    pub available_dates: Option<Vec<DateTime<Utc>>>,
    pub availability: Option<bool>,
}

impl ServicePatch {
    pub fn apply(self, service: &mut Service) {
        if let Some(name) = self.name {
            service.name = name;
        }
        if let Some(category) = self.category {
            service.category = category;
        }
        if let Some(description) = self.description {
            service.description = description;
        }
        if let Some(price) = self.price {
            service.price = price;
        }
        if self.duration.is_some() {
            service.duration = self.duration;
        }
        if self.location.is_some() {
            service.location = self.location;
        }
        if self.image_url.is_some() {
            service.image_url = self.image_url;
        }
        if let Some(time_slots) = self.time_slots {
            service.time_slots = time_slots;
        }
        if let Some(available_dates) = self.available_dates {
            service.available_dates = available_dates;
        }
        if let Some(availability) = self.availability {
            service.availability = availability;
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: UserId,
    pub vendor_id: VendorId,
    pub service_id: Option<ServiceId>,
    pub date: DateTime<Utc>,
    pub status: BookingStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: UserId,
    pub vendor_id: VendorId,
    pub rating: i32,
    pub comment: Option<String>,
}

// ---------------------------------------------------------------------------
// Joined read models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct VendorWithUser {
    #[serde(flatten)]
    pub vendor: Vendor,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct VendorDetails {
    #[serde(flatten)]
    pub vendor: Vendor,
    pub user: User,
    pub services: Vec<Service>,
    pub reviews: Vec<ReviewWithUser>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewWithUser {
    #[serde(flatten)]
    pub review: Review,
    pub user: User,
}

/// Result of the atomic review insert: the stored review and the vendor with
/// its refreshed aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewReceipt {
    pub review: Review,
    pub vendor: Vendor,
}

/// Running rating aggregate for a vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RatingAggregate {
    pub total: i64,
    pub count: i64,
}

impl RatingAggregate {
    pub fn from_ratings<I: IntoIterator<Item = i32>>(ratings: I) -> Self {
        ratings.into_iter().fold(Self::default(), |agg, rating| agg.with(rating))
    }

    pub fn with(self, rating: i32) -> Self {
        Self {
            total: self.total + rating as i64,
            count: self.count + 1,
        }
    }

    /// Mean rounded half-up, 0 when empty
    pub fn rounded_mean(&self) -> i32 {
        if self.count == 0 {
            return 0;
        }
        ((2 * self.total + self.count) / (2 * self.count)) as i32
    }
}

/// Deserialize timestamps that arrive either as RFC 3339 or as a bare
/// `YYYY-MM-DD` date (interpreted as midnight UTC).
pub mod flexible_datetime {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| format!("Invalid date '{}'", raw))
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw).map(Some).map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }

    pub mod vec {
        use super::*;

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<DateTime<Utc>>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<Vec<String>>::deserialize(deserializer)? {
                Some(raw) => raw
                    .iter()
                    .map(|value| super::parse(value))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
