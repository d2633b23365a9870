// Copyright 2025 Vijaykumar Singh
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Booking workflow

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use super::policy::{authorize, Actor, Capability};
use crate::core::{
    Booking, BookingConfig, BookingId, BookingStatus, NewBooking, Result, ServiceId, UserId,
    VendorHiveError, VendorId,
};
use crate::storage::MarketplaceStore;

/// Validated booking request
#[derive(Debug, Clone)]
pub struct BookingDraft {
    /// Must name the caller when present
    pub user_id: Option<UserId>,
    pub vendor_id: VendorId,
    pub service_id: Option<ServiceId>,
    pub date: DateTime<Utc>,
    pub status: Option<BookingStatus>,
    pub notes: Option<String>,
}

pub struct BookingService {
    store: Arc<dyn MarketplaceStore>,
    enforce_transitions: bool,
}

impl BookingService {
    pub fn new(store: Arc<dyn MarketplaceStore>, config: &BookingConfig) -> Self {
        Self {
            store,
            enforce_transitions: config.enforce_transitions,
        }
    }

    pub async fn create(&self, actor: &Actor, draft: BookingDraft) -> Result<Booking> {
        authorize(
            actor,
            Capability::SubmitAs {
                user_id: draft.user_id,
                records: "bookings",
            },
        )?;

        if self.store.get_vendor(draft.vendor_id).await?.is_none() {
            return Err(VendorHiveError::not_found("Vendor", draft.vendor_id));
        }
        authorize(actor, Capability::BookVendor(draft.vendor_id))?;

        if let Some(service_id) = draft.service_id {
            let service = self
                .store
                .get_service(service_id)
                .await?
                .ok_or_else(|| VendorHiveError::not_found("Service", service_id))?;
            if service.vendor_id != draft.vendor_id {
                return Err(VendorHiveError::validation(
                    "Service does not belong to this vendor",
                ));
            }
        }

        let booking = self
            .store
            .create_booking(NewBooking {
                user_id: actor.user_id,
                vendor_id: draft.vendor_id,
                service_id: draft.service_id,
                date: draft.date,
                status: draft.status.unwrap_or_default(),
                notes: draft.notes,
            })
            .await?;

        info!(
            "📅 Booking {} created: user {} -> vendor {} ({})",
            booking.id, booking.user_id, booking.vendor_id, booking.status
        );
        Ok(booking)
    }

    /// Bookings the caller made, newest date first
    pub async fn list_for_user(&self, actor: &Actor) -> Result<Vec<Booking>> {
        debug!("📋 Listing bookings of user {}", actor.user_id);
        self.store.list_bookings_by_user(actor.user_id).await
    }

    /// Bookings made with the caller's business, newest date first
    pub async fn list_for_vendor(&self, actor: &Actor) -> Result<Vec<Booking>> {
        authorize(actor, Capability::VendorAccess)?;
        match actor.vendor_id {
            Some(id) => {
                debug!("📋 Listing bookings of vendor {}", id);
                self.store.list_bookings_by_vendor(id).await
            }
            None => Err(VendorHiveError::not_found("Vendor profile", actor.user_id)),
        }
    }

    pub async fn update_status(
        &self,
        actor: &Actor,
        id: BookingId,
        status: BookingStatus,
    ) -> Result<Booking> {
        let booking = self
            .store
            .get_booking(id)
            .await?
            .ok_or_else(|| VendorHiveError::not_found("Booking", id))?;
        authorize(actor, Capability::UpdateBooking(&booking))?;

        // Enforcement pins the write to the status the check was made against
        let expected = if self.enforce_transitions {
            if !booking.status.can_transition_to(status) {
                return Err(VendorHiveError::validation(format!(
                    "Cannot change booking status from {} to {}",
                    booking.status, status
                )));
            }
            Some(booking.status)
        } else {
            None
        };

        let updated = self
            .store
            .update_booking_status(id, status, expected)
            .await?
            .ok_or_else(|| VendorHiveError::not_found("Booking", id))?;
        info!("🔄 Booking {} status {} -> {}", id, booking.status, updated.status);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{NewUser, NewVendor, Role};
    use crate::storage::MemoryMarketplaceStore;
    use chrono::TimeZone;

    struct Fixture {
        store: Arc<dyn MarketplaceStore>,
        customer: Actor,
        vendor: Actor,
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn MarketplaceStore> = Arc::new(MemoryMarketplaceStore::new());
        let new_user = |name: &str, role| NewUser {
            name: name.to_string(),
            username: name.to_string(),
            email: format!("{}@example.com", name),
            password_hash: "hash".to_string(),
            role,
            profile_image: None,
            phone: None,
            bio: None,
            location: None,
        };

        let ann = store.create_user(new_user("ann", Role::User)).await.unwrap();
        let joe = store.create_user(new_user("joe", Role::Vendor)).await.unwrap();
        let shop = store
            .create_vendor(NewVendor {
                user_id: joe.id,
                business_name: "Joe's Plumbing".to_string(),
                category: "Plumbing".to_string(),
                description: String::new(),
                services: vec![],
                business_hours: None,
                cover_image: None,
            })
            .await
            .unwrap();

        Fixture {
            store,
            customer: Actor {
                user_id: ann.id,
                role: Role::User,
                vendor_id: None,
            },
            vendor: Actor {
                user_id: joe.id,
                role: Role::Vendor,
                vendor_id: Some(shop.id),
            },
        }
    }

    fn draft(vendor_id: VendorId) -> BookingDraft {
        BookingDraft {
            user_id: None,
            vendor_id,
            service_id: None,
            date: Utc.with_ymd_and_hms(2025, 6, 1, 14, 30, 0).unwrap(),
            status: None,
            notes: Some("Kitchen sink".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_pending() {
        let f = fixture().await;
        let bookings = BookingService::new(f.store.clone(), &BookingConfig::default());
        let vendor_id = f.vendor.vendor_id.unwrap();

        let booking = bookings.create(&f.customer, draft(vendor_id)).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.user_id, f.customer.user_id);

        assert!(matches!(
            bookings.create(&f.vendor, draft(vendor_id)).await,
            Err(VendorHiveError::Forbidden(_))
        ));
        assert!(matches!(
            bookings.create(&f.customer, draft(404)).await,
            Err(VendorHiveError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_permissive_status_updates_by_default() {
        let f = fixture().await;
        let bookings = BookingService::new(f.store.clone(), &BookingConfig::default());
        let booking = bookings
            .create(&f.customer, draft(f.vendor.vendor_id.unwrap()))
            .await
            .unwrap();

        let done = bookings
            .update_status(&f.vendor, booking.id, BookingStatus::Completed)
            .await
            .unwrap();
        assert_eq!(done.status, BookingStatus::Completed);

        let reopened = bookings
            .update_status(&f.customer, booking.id, BookingStatus::Pending)
            .await
            .unwrap();
        assert_eq!(reopened.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_enforced_transitions_reject_skips() {
        let f = fixture().await;
        let bookings = BookingService::new(
            f.store.clone(),
            &BookingConfig {
                enforce_transitions: true,
            },
        );
        let booking = bookings
            .create(&f.customer, draft(f.vendor.vendor_id.unwrap()))
            .await
            .unwrap();

        assert!(matches!(
            bookings.update_status(&f.vendor, booking.id, BookingStatus::Completed).await,
            Err(VendorHiveError::Validation(_))
        ));
        bookings
            .update_status(&f.vendor, booking.id, BookingStatus::Confirmed)
            .await
            .unwrap();
        bookings
            .update_status(&f.vendor, booking.id, BookingStatus::Completed)
            .await
            .unwrap();
        assert!(bookings
            .update_status(&f.customer, booking.id, BookingStatus::Cancelled)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_enforced_update_rejects_stale_read() {
        let f = fixture().await;
        let booking = f
            .store
            .create_booking(NewBooking {
                user_id: f.customer.user_id,
                vendor_id: f.vendor.vendor_id.unwrap(),
                service_id: None,
                date: Utc.with_ymd_and_hms(2025, 6, 1, 14, 30, 0).unwrap(),
                status: BookingStatus::Pending,
                notes: None,
            })
            .await
            .unwrap();

        let bookings = BookingService::new(
            f.store.clone(),
            &BookingConfig {
                enforce_transitions: true,
            },
        );
        bookings
            .update_status(&f.customer, booking.id, BookingStatus::Cancelled)
            .await
            .unwrap();

        // A writer still holding the "pending" read must not overwrite
        let stale = f
            .store
            .update_booking_status(booking.id, BookingStatus::Confirmed, Some(BookingStatus::Pending))
            .await;
        assert!(matches!(stale, Err(VendorHiveError::Conflict(_))));
        let stored = f.store.get_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_strangers_cannot_update_status() {
        let f = fixture().await;
        let bookings = BookingService::new(f.store.clone(), &BookingConfig::default());
        let booking = bookings
            .create(&f.customer, draft(f.vendor.vendor_id.unwrap()))
            .await
            .unwrap();

        let stranger = Actor {
            user_id: 77,
            role: Role::User,
            vendor_id: None,
        };
        assert!(matches!(
            bookings.update_status(&stranger, booking.id, BookingStatus::Cancelled).await,
            Err(VendorHiveError::Forbidden(_))
        ));
    }
}
