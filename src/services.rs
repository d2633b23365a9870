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

//! Service layer: business rules between the HTTP handlers and storage

pub mod booking_service;
pub mod catalog_service;
pub mod credentials;
pub mod identity_service;
pub mod media_service;
pub mod policy;
pub mod review_service;
pub mod vendor_service;

use std::sync::Arc;
use tracing::info;

use crate::core::Config;
use crate::storage::MarketplaceStore;

pub use booking_service::{BookingDraft, BookingService};
pub use catalog_service::{CatalogService, ServiceDraft};
pub use identity_service::{
    AuthSession, IdentityService, Profile, ProfileUpdate, Registration, VendorProfileDraft,
};
pub use media_service::{ImageUpload, MediaService, MediaUploader};
pub use policy::{authorize, Actor, Capability};
pub use review_service::{ReviewDraft, ReviewService};
pub use vendor_service::VendorService;

/// Shared services for thin protocol handlers
#[derive(Clone)]
pub struct MarketplaceServices {
    pub identity: Arc<IdentityService>,
    pub vendors: Arc<VendorService>,
    pub catalog: Arc<CatalogService>,
    pub bookings: Arc<BookingService>,
    pub reviews: Arc<ReviewService>,
    pub media: Arc<MediaService>,
}

impl MarketplaceServices {
    /// Wire every service to one store
    pub fn new(store: Arc<dyn MarketplaceStore>, config: &Config) -> Self {
        Self::with_media(store, config, MediaService::from_config(&config.media))
    }

    /// Same as `new` with a caller-supplied media service
    pub fn with_media(store: Arc<dyn MarketplaceStore>, config: &Config, media: MediaService) -> Self {
        info!(
            "🔧 Initializing marketplace services on '{}' storage",
            store.backend_name()
        );
        Self {
            identity: Arc::new(IdentityService::new(store.clone(), &config.auth)),
            vendors: Arc::new(VendorService::new(store.clone())),
            catalog: Arc::new(CatalogService::new(store.clone())),
            bookings: Arc::new(BookingService::new(store.clone(), &config.booking)),
            reviews: Arc::new(ReviewService::new(store)),
            media: Arc::new(media),
        }
    }
}
