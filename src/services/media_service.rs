// Copyright 2025 Vijaykumar Singh
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Image uploads to the media host
//!
//! Uploads are signed with the account secret and placed under the configured
//! folder. The host returns a public HTTPS URL that callers store on users,
//! vendors or services.

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{info, warn};

use super::policy::Actor;
use crate::core::{MediaConfig, Result, VendorHiveError};

/// Content types accepted for upload
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// A file received from a client
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Destination for uploaded images
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Store the image and return its public URL
    async fn upload_image(&self, image: ImageUpload) -> Result<String>;
}

/// Signed uploads to Cloudinary's REST API
pub struct CloudinaryUploader {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    folder: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryResponse {
    secure_url: String,
}

impl CloudinaryUploader {
    /// None unless cloud name, key and secret are all configured
    pub fn from_config(config: &MediaConfig) -> Option<Self> {
        Some(Self {
            client: reqwest::Client::new(),
            cloud_name: config.cloud_name.clone()?,
            api_key: config.api_key.clone()?,
            api_secret: config.api_secret.clone()?,
            folder: config.folder.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("https://api.cloudinary.com/v1_1/{}/image/upload", self.cloud_name)
    }
}

/// Hex SHA-256 over the alphabetically sorted `key=value` pairs joined by `&`,
/// followed by the secret
fn sign_params(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let digest = Sha256::digest(format!("{}{}", joined, secret).as_bytes());
    digest.iter().fold(String::with_capacity(64), |mut out, byte| {
        let _ = write!(out, "{:02x}", byte);
        out
    })
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload_image(&self, image: ImageUpload) -> Result<String> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("folder", self.folder.as_str()), ("timestamp", timestamp.as_str())],
            &self.api_secret,
        );

        let file = reqwest::multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| VendorHiveError::Media(format!("invalid content type: {}", e)))?;
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.folder.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(self.endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(|e| VendorHiveError::Media(format!("upload request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VendorHiveError::Media(format!(
                "media host rejected upload ({}): {}",
                status, body
            )));
        }

        let uploaded: CloudinaryResponse = response
            .json()
            .await
            .map_err(|e| VendorHiveError::Media(format!("unreadable upload response: {}", e)))?;
        Ok(uploaded.secure_url)
    }
}

/// Stand-in used when no media host is configured
pub struct UnconfiguredUploader;

#[async_trait]
impl MediaUploader for UnconfiguredUploader {
    async fn upload_image(&self, _image: ImageUpload) -> Result<String> {
        Err(VendorHiveError::Media("media host is not configured".to_string()))
    }
}

pub struct MediaService {
    uploader: Arc<dyn MediaUploader>,
    max_bytes: usize,
}

impl MediaService {
    pub fn new(uploader: Arc<dyn MediaUploader>, config: &MediaConfig) -> Self {
        Self {
            uploader,
            max_bytes: (config.max_upload_mb as usize) * 1024 * 1024,
        }
    }

    /// Pick the Cloudinary uploader when credentials are present
    pub fn from_config(config: &MediaConfig) -> Self {
        let uploader: Arc<dyn MediaUploader> = match CloudinaryUploader::from_config(config) {
            Some(cloudinary) => Arc::new(cloudinary),
            None => {
                warn!("⚠️ Media host not configured; uploads will fail");
                Arc::new(UnconfiguredUploader)
            }
        };
        Self::new(uploader, config)
    }

    pub async fn upload(&self, actor: &Actor, image: ImageUpload) -> Result<String> {
        if image.bytes.is_empty() {
            return Err(VendorHiveError::validation("No file uploaded"));
        }
        if !ALLOWED_IMAGE_TYPES.contains(&image.content_type.as_str()) {
            return Err(VendorHiveError::validation(
                "Only JPEG, PNG and GIF images are allowed",
            ));
        }
        if image.bytes.len() > self.max_bytes {
            return Err(VendorHiveError::validation(format!(
                "Image exceeds the {} MB limit",
                self.max_bytes / (1024 * 1024)
            )));
        }

        let size = image.bytes.len();
        let url = self.uploader.upload_image(image).await?;
        info!("🖼️ User {} uploaded {} bytes -> {}", actor.user_id, size, url);
        Ok(url)
    }
}
