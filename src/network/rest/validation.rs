// Copyright 2025 Vijaykumar Singh
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Request schemas
//!
//! Each JSON body is deserialized into a request struct and validated into the
//! service-layer input before any handler logic runs. Failures are 400s.

use axum::{
    async_trait,
    body::HttpBody,
    extract::{FromRequest, Json},
    http::Request,
    BoxError,
};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::OnceLock;

use super::error::ApiError;
use crate::core::{
    flexible_datetime, BookingStatus, Result, Role, ServicePatch, TimeSlot, UserId, VendorHiveError,
    VendorId, VendorPatch,
};
use crate::services::{
    BookingDraft, ProfileUpdate, Registration, ReviewDraft, ServiceDraft, VendorProfileDraft,
};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Turns a raw request body into validated service input
pub trait Validate {
    type Valid;

    fn validate(self) -> Result<Self::Valid>;
}

/// JSON body extractor that runs `Validate` before the handler sees it
pub struct ValidJson<R: Validate>(pub R::Valid);

#[async_trait]
impl<R, S, B> FromRequest<S, B> for ValidJson<R>
where
    R: Validate + DeserializeOwned + Send,
    S: Send + Sync,
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request<B>, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let Json(body) = Json::<R>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError(VendorHiveError::validation(rejection.body_text())))?;
        Ok(ValidJson(body.validate()?))
    }
}

/// Parse a numeric path id, naming the resource in the error
pub fn parse_id(raw: &str, resource: &str) -> Result<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| VendorHiveError::validation(format!("Invalid {} ID", resource)))
}

fn is_email(candidate: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(candidate))
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(VendorHiveError::validation(format!("{} is required", field))),
    }
}

/// Present fields must not be blank
fn non_blank(value: Option<String>, field: &str) -> Result<Option<String>> {
    match value {
        Some(v) => required(Some(v), field).map(Some),
        None => Ok(None),
    }
}

fn check_email(email: String) -> Result<String> {
    let email = email.trim().to_lowercase();
    if !is_email(&email) {
        return Err(VendorHiveError::validation("Invalid email address"));
    }
    Ok(email)
}

fn check_password(password: String, field: &str) -> Result<String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(VendorHiveError::validation(format!(
            "{} must be at least {} characters",
            field, MIN_PASSWORD_LEN
        )));
    }
    Ok(password)
}

/// Prices are free text; bare numbers are accepted and kept as written
fn price_text(value: Option<serde_json::Value>) -> Result<Option<String>> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => {
            Err(VendorHiveError::validation("Price is required"))
        }
        Some(serde_json::Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(VendorHiveError::validation("Price must be text or a number")),
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub profile_image: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub vendor: Option<VendorProfileRequest>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorProfileRequest {
    pub business_name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    pub business_hours: Option<serde_json::Value>,
    pub cover_image: Option<String>,
}

impl Validate for RegisterRequest {
    type Valid = Registration;

    fn validate(self) -> Result<Registration> {
        let name = required(self.name, "Name")?;
        let username = required(self.username, "Username")?;
        let email = check_email(required(self.email, "Email")?)?;
        let password = check_password(
            self.password
                .ok_or_else(|| VendorHiveError::validation("Password is required"))?,
            "Password",
        )?;
        let role = match self.role.as_deref() {
            None => Role::User,
            Some(raw) => raw.parse::<Role>().map_err(VendorHiveError::Validation)?,
        };

        let vendor = match self.vendor {
            Some(profile) => Some(VendorProfileDraft {
                business_name: non_blank(profile.business_name, "Business name")?,
                category: non_blank(profile.category, "Category")?,
                description: profile.description,
                services: profile.services,
                business_hours: profile.business_hours,
                cover_image: profile.cover_image,
            }),
            None => None,
        };

        Ok(Registration {
            name,
            username,
            email,
            password,
            role,
            profile_image: self.profile_image,
            phone: self.phone,
            bio: self.bio,
            location: self.location,
            vendor,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Normalized email and password
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    type Valid = Credentials;

    fn validate(self) -> Result<Credentials> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
                Ok(Credentials {
                    email: email.trim().to_lowercase(),
                    password,
                })
            }
            _ => Err(VendorHiveError::validation("Email and password are required")),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_image: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

impl Validate for ProfileUpdateRequest {
    type Valid = ProfileUpdate;

    fn validate(self) -> Result<ProfileUpdate> {
        Ok(ProfileUpdate {
            name: non_blank(self.name, "Name")?,
            username: non_blank(self.username, "Username")?,
            email: self.email.map(check_email).transpose()?,
            password: self
                .password
                .map(|p| check_password(p, "Password"))
                .transpose()?,
            profile_image: self.profile_image,
            phone: self.phone,
            bio: self.bio,
            location: self.location,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

impl Validate for PasswordChangeRequest {
    type Valid = PasswordChange;

    fn validate(self) -> Result<PasswordChange> {
        let current_password = self
            .current_password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| VendorHiveError::validation("Current password is required"))?;
        let new_password = check_password(
            self.new_password
                .ok_or_else(|| VendorHiveError::validation("New password is required"))?,
            "New password",
        )?;
        Ok(PasswordChange {
            current_password,
            new_password,
        })
    }
}

// ---------------------------------------------------------------------------
// Vendors and services
// ---------------------------------------------------------------------------

/// Editable vendor fields; rating and reviewCount are not accepted
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorUpdateRequest {
    pub business_name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub services: Option<Vec<String>>,
    pub business_hours: Option<serde_json::Value>,
    pub cover_image: Option<String>,
}

impl Validate for VendorUpdateRequest {
    type Valid = VendorPatch;

    fn validate(self) -> Result<VendorPatch> {
        Ok(VendorPatch {
            business_name: non_blank(self.business_name, "Business name")?,
            category: non_blank(self.category, "Category")?,
            description: self.description,
            services: self.services,
            business_hours: self.business_hours,
            cover_image: self.cover_image,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub vendor_id: Option<VendorId>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<serde_json::Value>,
    pub duration: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    #[serde(default, deserialize_with = "flexible_datetime::vec::deserialize")]
    pub available_dates: Option<Vec<DateTime<Utc>>>,
    pub availability: Option<bool>,
}

impl Validate for ServiceRequest {
    type Valid = ServiceDraft;

    fn validate(self) -> Result<ServiceDraft> {
        Ok(ServiceDraft {
            vendor_id: self.vendor_id,
            name: required(self.name, "Service name")?,
            category: required(self.category, "Category")?,
            description: self.description.unwrap_or_default(),
            price: price_text(self.price)?
                .ok_or_else(|| VendorHiveError::validation("Price is required"))?,
            duration: self.duration,
            location: self.location,
            image_url: self.image_url,
            time_slots: self.time_slots,
            available_dates: self.available_dates.unwrap_or_default(),
            availability: self.availability.unwrap_or(true),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUpdateRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<serde_json::Value>,
    pub duration: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub time_slots: Option<Vec<TimeSlot>>,
    #[serde(default, deserialize_with = "flexible_datetime::vec::deserialize")]
    pub available_dates: Option<Vec<DateTime<Utc>>>,
    pub availability: Option<bool>,
}

impl Validate for ServiceUpdateRequest {
    type Valid = ServicePatch;

    fn validate(self) -> Result<ServicePatch> {
        Ok(ServicePatch {
            name: non_blank(self.name, "Service name")?,
            category: non_blank(self.category, "Category")?,
            description: self.description,
            price: price_text(self.price)?,
            duration: self.duration,
            location: self.location,
            image_url: self.image_url,
            time_slots: self.time_slots,
            available_dates: self.available_dates,
            availability: self.availability,
        })
    }
}

// ---------------------------------------------------------------------------
// Bookings and reviews
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub user_id: Option<UserId>,
    pub vendor_id: Option<VendorId>,
    pub service_id: Option<i64>,
    #[serde(default, deserialize_with = "flexible_datetime::option::deserialize")]
    pub date: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

fn parse_status(raw: &str) -> Result<BookingStatus> {
    raw.parse::<BookingStatus>().map_err(VendorHiveError::Validation)
}

impl Validate for BookingRequest {
    type Valid = BookingDraft;

    fn validate(self) -> Result<BookingDraft> {
        Ok(BookingDraft {
            user_id: self.user_id,
            vendor_id: self
                .vendor_id
                .ok_or_else(|| VendorHiveError::validation("Vendor ID is required"))?,
            service_id: self.service_id,
            date: self
                .date
                .ok_or_else(|| VendorHiveError::validation("Booking date is required"))?,
            status: self.status.as_deref().map(parse_status).transpose()?,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: Option<String>,
}

impl Validate for StatusRequest {
    type Valid = BookingStatus;

    fn validate(self) -> Result<BookingStatus> {
        match self.status {
            Some(raw) => parse_status(&raw),
            None => Err(VendorHiveError::validation("Invalid status")),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub user_id: Option<UserId>,
    pub vendor_id: Option<VendorId>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

impl Validate for ReviewRequest {
    type Valid = ReviewDraft;

    fn validate(self) -> Result<ReviewDraft> {
        let rating = match self.rating {
            Some(r @ 1..=5) => r as i32,
            _ => return Err(VendorHiveError::validation("Rating must be between 1 and 5")),
        };
        Ok(ReviewDraft {
            user_id: self.user_id,
            vendor_id: self
                .vendor_id
                .ok_or_else(|| VendorHiveError::validation("Vendor ID is required"))?,
            rating,
            comment: self.comment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse<R: DeserializeOwned>(value: serde_json::Value) -> R {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_register_requires_long_password_and_valid_email() {
        let short: RegisterRequest = parse(json!({
            "name": "Ann", "username": "ann", "email": "ann@example.com", "password": "12345"
        }));
        assert!(short.validate().is_err());

        let bad_email: RegisterRequest = parse(json!({
            "name": "Ann", "username": "ann", "email": "not-an-email", "password": "123456"
        }));
        assert!(bad_email.validate().is_err());

        let ok: RegisterRequest = parse(json!({
            "name": "Ann", "username": "ann", "email": "Ann@Example.com", "password": "123456"
        }));
        let registration = ok.validate().unwrap();
        assert_eq!(registration.email, "ann@example.com");
        assert_eq!(registration.role, Role::User);
    }

    #[test]
    fn test_register_rejects_unknown_role() {
        let req: RegisterRequest = parse(json!({
            "name": "Ann", "username": "ann", "email": "ann@example.com",
            "password": "123456", "role": "admin"
        }));
        assert!(matches!(req.validate(), Err(VendorHiveError::Validation(_))));
    }

    #[test]
    fn test_review_rating_bounds() {
        for (rating, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let req: ReviewRequest = parse(json!({ "vendorId": 1, "rating": rating }));
            assert_eq!(req.validate().is_ok(), ok, "rating {}", rating);
        }
        let missing: ReviewRequest = parse(json!({ "vendorId": 1 }));
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_status_must_be_known_value() {
        let ok: StatusRequest = parse(json!({ "status": "confirmed" }));
        assert_eq!(ok.validate().unwrap(), BookingStatus::Confirmed);

        let bad: StatusRequest = parse(json!({ "status": "archived" }));
        let err = bad.validate().unwrap_err();
        assert_eq!(err.to_string(), "Invalid status");
    }

    #[test]
    fn test_booking_accepts_bare_dates() {
        let req: BookingRequest = parse(json!({ "vendorId": 2, "date": "2025-06-01" }));
        let draft = req.validate().unwrap();
        assert_eq!(draft.date.to_rfc3339(), "2025-06-01T00:00:00+00:00");
        assert_eq!(draft.status, None);

        let no_vendor: BookingRequest = parse(json!({ "date": "2025-06-01" }));
        assert!(no_vendor.validate().is_err());
    }

    #[test]
    fn test_service_price_and_defaults() {
        let req: ServiceRequest = parse(json!({
            "name": "Drain Cleaning", "category": "Plumbing", "price": 50,
            "availableDates": ["2025-06-01", "2025-06-02T10:00:00Z"]
        }));
        let draft = req.validate().unwrap();
        assert_eq!(draft.price, "50");
        assert!(draft.availability);
        assert_eq!(draft.available_dates.len(), 2);
        assert_eq!(draft.description, "");

        let no_price: ServiceRequest = parse(json!({ "name": "X", "category": "Y" }));
        assert!(no_price.validate().is_err());
    }

    #[test]
    fn test_blank_price_is_reported_as_missing() {
        let blank: ServiceRequest = parse(json!({ "name": "X", "category": "Y", "price": "  " }));
        let err = blank.validate().unwrap_err();
        assert_eq!(err.to_string(), "Price is required");

        let blank_update: ServiceUpdateRequest = parse(json!({ "price": "" }));
        assert_eq!(blank_update.validate().unwrap_err().to_string(), "Price is required");

        let wrong_type: ServiceRequest = parse(json!({ "name": "X", "category": "Y", "price": true }));
        assert_eq!(
            wrong_type.validate().unwrap_err().to_string(),
            "Price must be text or a number"
        );
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42", "vendor").unwrap(), 42);
        assert_eq!(
            parse_id("abc", "vendor").unwrap_err().to_string(),
            "Invalid vendor ID"
        );
        assert!(parse_id("-1", "booking").is_err());
    }
}
