// Copyright 2025 Vijaykumar Singh
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Reviews and the vendor rating aggregate

use std::sync::Arc;
use tracing::info;

use super::policy::{authorize, Actor, Capability};
use crate::core::{NewReview, Result, ReviewReceipt, UserId, VendorHiveError, VendorId};
use crate::storage::MarketplaceStore;

/// Validated review; the rating is already within 1..=5
#[derive(Debug, Clone)]
pub struct ReviewDraft {
    pub user_id: Option<UserId>,
    pub vendor_id: VendorId,
    pub rating: i32,
    pub comment: Option<String>,
}

pub struct ReviewService {
    store: Arc<dyn MarketplaceStore>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn MarketplaceStore>) -> Self {
        Self { store }
    }

    /// Store a review; the vendor's rating and count are refreshed by the
    /// same storage call
    pub async fn create(&self, actor: &Actor, draft: ReviewDraft) -> Result<ReviewReceipt> {
        authorize(
            actor,
            Capability::SubmitAs {
                user_id: draft.user_id,
                records: "reviews",
            },
        )?;

        if self.store.get_vendor(draft.vendor_id).await?.is_none() {
            return Err(VendorHiveError::not_found("Vendor", draft.vendor_id));
        }
        authorize(actor, Capability::ReviewVendor(draft.vendor_id))?;

        let receipt = self
            .store
            .create_review(NewReview {
                user_id: actor.user_id,
                vendor_id: draft.vendor_id,
                rating: draft.rating,
                comment: draft.comment,
            })
            .await?;

        info!(
            "⭐ User {} rated vendor {} {} (now {} over {})",
            actor.user_id,
            receipt.vendor.id,
            receipt.review.rating,
            receipt.vendor.rating,
            receipt.vendor.review_count
        );
        Ok(receipt)
    }
}
