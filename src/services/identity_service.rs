// Copyright 2025 Vijaykumar Singh
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Identity service: registration, login, profiles and token resolution

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::credentials::{hash_password_blocking, verify_password_blocking, TokenIssuer};
use super::policy::Actor;
use crate::core::{
    AuthConfig, NewUser, NewVendor, Result, Role, User, UserPatch, Vendor, VendorHiveError,
};
use crate::storage::backends::undo_on_error;
use crate::storage::MarketplaceStore;

/// Category given to vendor profiles created without one
pub const DEFAULT_VENDOR_CATEGORY: &str = "General";

/// Validated registration
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub profile_image: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    /// Business details for vendor-role registrations
    pub vendor: Option<VendorProfileDraft>,
}

#[derive(Debug, Clone, Default)]
pub struct VendorProfileDraft {
    pub business_name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub services: Vec<String>,
    pub business_hours: Option<serde_json::Value>,
    pub cover_image: Option<String>,
}

/// Validated profile edit
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_image: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

/// Returned by register and login
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

/// The caller's account and, for vendors, their business profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user: User,
    pub vendor_profile: Option<Vendor>,
}

pub struct IdentityService {
    store: Arc<dyn MarketplaceStore>,
    tokens: TokenIssuer,
}

impl IdentityService {
    pub fn new(store: Arc<dyn MarketplaceStore>, auth: &AuthConfig) -> Self {
        Self {
            store,
            tokens: TokenIssuer::new(auth),
        }
    }

    /// Create an account (and a vendor profile for vendor-role accounts)
    pub async fn register(&self, registration: Registration) -> Result<AuthSession> {
        info!("🆕 Registering {} account: {}", registration.role, registration.username);

        if self.store.get_user_by_email(&registration.email).await?.is_some() {
            return Err(VendorHiveError::Conflict("Email already in use".to_string()));
        }
        if self
            .store
            .get_user_by_username(&registration.username)
            .await?
            .is_some()
        {
            return Err(VendorHiveError::Conflict("Username already taken".to_string()));
        }

        let password_hash = hash_password_blocking(&registration.password).await?;
        let user = self
            .store
            .create_user(NewUser {
                name: registration.name,
                username: registration.username,
                email: registration.email,
                password_hash,
                role: registration.role,
                profile_image: registration.profile_image,
                phone: registration.phone,
                bio: registration.bio,
                location: registration.location,
            })
            .await?;

        if user.role == Role::Vendor {
            let draft = registration.vendor.unwrap_or_default();
            let created = self
                .store
                .create_vendor(NewVendor {
                    user_id: user.id,
                    business_name: draft.business_name.unwrap_or_else(|| user.name.clone()),
                    category: draft
                        .category
                        .unwrap_or_else(|| DEFAULT_VENDOR_CATEGORY.to_string()),
                    description: draft.description.unwrap_or_default(),
                    services: draft.services,
                    business_hours: draft.business_hours,
                    cover_image: draft.cover_image,
                })
                .await;
            // A vendor account without a profile is unusable; drop the account
            let vendor = undo_on_error(created, || async {
                warn!("↩️ Removing user {} after failed vendor profile creation", user.id);
                self.store.delete_user(user.id).await
            })
            .await?;
            info!("🏪 Vendor profile {} created for user {}", vendor.id, user.id);
        }

        let token = self.tokens.issue(&user)?;
        info!("✅ Registered user {} ({})", user.id, user.username);
        Ok(AuthSession { user, token })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let invalid = || VendorHiveError::Unauthenticated("Invalid email or password".to_string());

        let Some(user) = self.store.get_user_by_email(email).await? else {
            warn!("🔐 Login failed: unknown email");
            return Err(invalid());
        };
        if !verify_password_blocking(password, &user.password).await? {
            warn!("🔐 Login failed for user {}: wrong password", user.id);
            return Err(invalid());
        }

        let token = self.tokens.issue(&user)?;
        info!("🔓 User {} logged in", user.id);
        Ok(AuthSession { user, token })
    }

    /// Turn a bearer token into the calling actor. Tokens for deleted users
    /// are rejected.
    pub async fn resolve_actor(&self, token: &str) -> Result<Actor> {
        let claims = self.tokens.verify(token)?;

        let Some(user) = self.store.get_user(claims.sub).await? else {
            return Err(VendorHiveError::Unauthenticated(
                "Invalid or expired token".to_string(),
            ));
        };

        let vendor_id = match user.role {
            Role::Vendor => self.store.get_vendor_by_user_id(user.id).await?.map(|v| v.id),
            Role::User => None,
        };

        debug!("🔐 Resolved actor {} ({})", user.id, user.role);
        Ok(Actor {
            user_id: user.id,
            role: user.role,
            vendor_id,
        })
    }

    pub async fn profile(&self, actor: &Actor) -> Result<Profile> {
        let user = self.current_user(actor).await?;
        let vendor_profile = match actor.vendor_id {
            Some(id) => self.store.get_vendor(id).await?,
            None => None,
        };
        Ok(Profile {
            user,
            vendor_profile,
        })
    }

    pub async fn update_profile(&self, actor: &Actor, update: ProfileUpdate) -> Result<User> {
        let password_hash = match &update.password {
            Some(password) => Some(hash_password_blocking(password).await?),
            None => None,
        };

        let patch = UserPatch {
            name: update.name,
            username: update.username,
            email: update.email,
            password_hash,
            profile_image: update.profile_image,
            phone: update.phone,
            bio: update.bio,
            location: update.location,
        };

        let user = self
            .store
            .update_user(actor.user_id, patch)
            .await?
            .ok_or_else(|| VendorHiveError::not_found("User", actor.user_id))?;
        info!("📝 Updated profile of user {}", user.id);
        Ok(user)
    }

    pub async fn change_password(
        &self,
        actor: &Actor,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let user = self.current_user(actor).await?;
        if !verify_password_blocking(current_password, &user.password).await? {
            return Err(VendorHiveError::validation("Current password is incorrect"));
        }

        let patch = UserPatch {
            password_hash: Some(hash_password_blocking(new_password).await?),
            ..Default::default()
        };
        self.store.update_user(user.id, patch).await?;
        info!("🔑 Password changed for user {}", user.id);
        Ok(())
    }

    async fn current_user(&self, actor: &Actor) -> Result<User> {
        self.store
            .get_user(actor.user_id)
            .await?
            .ok_or_else(|| VendorHiveError::not_found("User", actor.user_id))
    }
}
