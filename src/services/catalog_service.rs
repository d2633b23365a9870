// Copyright 2025 Vijaykumar Singh
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Service listings offered by vendors

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use super::policy::{authorize, Actor, Capability};
use crate::core::{
    NewService, Result, Service, ServiceId, ServicePatch, TimeSlot, VendorHiveError, VendorId,
};
use crate::storage::MarketplaceStore;

/// Validated listing; `vendor_id` defaults to the caller's profile
#[derive(Debug, Clone)]
pub struct ServiceDraft {
    pub vendor_id: Option<VendorId>,
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

impl ServiceDraft {
    fn into_new_service(self, vendor_id: VendorId) -> NewService {
        NewService {
            vendor_id,
            name: self.name,
            category: self.category,
            description: self.description,
            price: self.price,
            duration: self.duration,
            location: self.location,
            image_url: self.image_url,
            time_slots: self.time_slots,
            available_dates: self.available_dates,
            availability: self.availability,
        }
    }
}

pub struct CatalogService {
    store: Arc<dyn MarketplaceStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn MarketplaceStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, actor: &Actor, draft: ServiceDraft) -> Result<Service> {
        authorize(actor, Capability::VendorAccess)?;
        let own = actor
            .vendor_id
            .ok_or_else(|| VendorHiveError::not_found("Vendor profile", actor.user_id))?;
        if draft.vendor_id.is_some_and(|requested| requested != own) {
            return Err(VendorHiveError::forbidden(
                "You can only create services for your own business",
            ));
        }

        let service = self.store.create_service(draft.into_new_service(own)).await?;
        info!("🆕 Vendor {} listed service {} ({})", own, service.id, service.name);
        Ok(service)
    }

    pub async fn get(&self, id: ServiceId) -> Result<Service> {
        debug!("🔍 Getting service: {}", id);
        self.store
            .get_service(id)
            .await?
            .ok_or_else(|| VendorHiveError::not_found("Service", id))
    }

    /// The caller's own listings
    pub async fn list_mine(&self, actor: &Actor) -> Result<Vec<Service>> {
        authorize(actor, Capability::VendorAccess)?;
        match actor.vendor_id {
            Some(id) => self.store.list_services_by_vendor(id).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn update(&self, actor: &Actor, id: ServiceId, patch: ServicePatch) -> Result<Service> {
        let existing = self.get(id).await?;
        authorize(
            actor,
            Capability::ManageService {
                service: &existing,
                verb: "update",
            },
        )?;

        let service = self
            .store
            .update_service(id, patch)
            .await?
            .ok_or_else(|| VendorHiveError::not_found("Service", id))?;
        info!("📝 Updated service {}", id);
        Ok(service)
    }

    pub async fn delete(&self, actor: &Actor, id: ServiceId) -> Result<()> {
        let existing = self.get(id).await?;
        authorize(
            actor,
            Capability::ManageService {
                service: &existing,
                verb: "delete",
            },
        )?;

        if !self.store.delete_service(id).await? {
            return Err(VendorHiveError::not_found("Service", id));
        }
        info!("🗑️ Deleted service {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{NewUser, NewVendor, Role};
    use crate::storage::MemoryMarketplaceStore;

    async fn vendor_actor(store: &Arc<dyn MarketplaceStore>, username: &str) -> Actor {
        let user = store
            .create_user(NewUser {
                name: username.to_string(),
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: "hash".to_string(),
                role: Role::Vendor,
                profile_image: None,
                phone: None,
                bio: None,
                location: None,
            })
            .await
            .unwrap();
        let vendor = store
            .create_vendor(NewVendor {
                user_id: user.id,
                business_name: format!("{} Co", username),
                category: "General".to_string(),
                description: String::new(),
                services: vec![],
                business_hours: None,
                cover_image: None,
            })
            .await
            .unwrap();
        Actor {
            user_id: user.id,
            role: Role::Vendor,
            vendor_id: Some(vendor.id),
        }
    }

    fn draft(name: &str) -> ServiceDraft {
        ServiceDraft {
            vendor_id: None,
            name: name.to_string(),
            category: "Plumbing".to_string(),
            description: "Clears blocked drains".to_string(),
            price: "$50".to_string(),
            duration: Some("1 hour".to_string()),
            location: None,
            image_url: None,
            time_slots: vec![],
            available_dates: vec![],
            availability: true,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_own_profile() {
        let store: Arc<dyn MarketplaceStore> = Arc::new(MemoryMarketplaceStore::new());
        let catalog = CatalogService::new(store.clone());
        let joe = vendor_actor(&store, "joe").await;

        let service = catalog.create(&joe, draft("Drain Cleaning")).await.unwrap();
        assert_eq!(Some(service.vendor_id), joe.vendor_id);
        assert_eq!(catalog.list_mine(&joe).await.unwrap().len(), 1);

        let mut foreign = draft("Rewiring");
        foreign.vendor_id = Some(999);
        assert!(matches!(
            catalog.create(&joe, foreign).await,
            Err(VendorHiveError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_only_owner_can_update_or_delete() {
        let store: Arc<dyn MarketplaceStore> = Arc::new(MemoryMarketplaceStore::new());
        let catalog = CatalogService::new(store.clone());
        let joe = vendor_actor(&store, "joe").await;
        let sue = vendor_actor(&store, "sue").await;

        let service = catalog.create(&joe, draft("Drain Cleaning")).await.unwrap();
        let patch = ServicePatch {
            price: Some("$60".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            catalog.update(&sue, service.id, patch.clone()).await,
            Err(VendorHiveError::Forbidden(_))
        ));
        assert!(matches!(
            catalog.delete(&sue, service.id).await,
            Err(VendorHiveError::Forbidden(_))
        ));

        let updated = catalog.update(&joe, service.id, patch).await.unwrap();
        assert_eq!(updated.price, "$60");

        catalog.delete(&joe, service.id).await.unwrap();
        assert!(matches!(
            catalog.get(service.id).await,
            Err(VendorHiveError::NotFound { .. })
        ));
    }
}
