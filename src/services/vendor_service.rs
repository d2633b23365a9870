// Copyright 2025 Vijaykumar Singh
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Vendor discovery and profile management

use std::sync::Arc;
use tracing::{debug, info};

use super::policy::{authorize, Actor, Capability};
use crate::core::{
    Result, ReviewWithUser, Service, Vendor, VendorDetails, VendorHiveError, VendorId,
    VendorPatch, VendorWithUser,
};
use crate::storage::MarketplaceStore;

pub struct VendorService {
    store: Arc<dyn MarketplaceStore>,
}

impl VendorService {
    pub fn new(store: Arc<dyn MarketplaceStore>) -> Self {
        Self { store }
    }

    /// All vendors, or those matching `query` when it has content
    pub async fn list(&self, query: Option<&str>) -> Result<Vec<VendorWithUser>> {
        match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => {
                debug!("🔍 Searching vendors for '{}'", q);
                self.store.search_vendors(q).await
            }
            None => {
                debug!("📋 Listing all vendors");
                self.store.list_vendors().await
            }
        }
    }

    /// Vendor with owner, services and reviews
    pub async fn details(&self, id: VendorId) -> Result<VendorDetails> {
        let vendor = self.require(id).await?;
        let user = self
            .store
            .get_user(vendor.user_id)
            .await?
            .ok_or_else(|| VendorHiveError::not_found("Vendor", id))?;
        let services = self.store.list_services_by_vendor(id).await?;
        let reviews = self.store.list_reviews_by_vendor(id).await?;

        Ok(VendorDetails {
            vendor,
            user,
            services,
            reviews,
        })
    }

    pub async fn services_of(&self, id: VendorId) -> Result<Vec<Service>> {
        self.require(id).await?;
        self.store.list_services_by_vendor(id).await
    }

    pub async fn reviews_of(&self, id: VendorId) -> Result<Vec<ReviewWithUser>> {
        self.require(id).await?;
        self.store.list_reviews_by_vendor(id).await
    }

    /// Edit the caller's own business profile
    pub async fn update_own(&self, actor: &Actor, patch: VendorPatch) -> Result<Vendor> {
        authorize(actor, Capability::VendorAccess)?;
        let id = actor
            .vendor_id
            .ok_or_else(|| VendorHiveError::not_found("Vendor profile", actor.user_id))?;

        let vendor = self
            .store
            .update_vendor(id, patch)
            .await?
            .ok_or_else(|| VendorHiveError::not_found("Vendor profile", id))?;
        info!("📝 Updated vendor profile {}", vendor.id);
        Ok(vendor)
    }

    async fn require(&self, id: VendorId) -> Result<Vendor> {
        self.store
            .get_vendor(id)
            .await?
            .ok_or_else(|| VendorHiveError::not_found("Vendor", id))
    }
}
