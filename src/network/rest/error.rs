// Copyright 2025 Vijaykumar Singh
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! HTTP mapping for service errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::core::VendorHiveError;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub error: &'static str,
}

/// Wrapper that renders a `VendorHiveError` as a JSON response
#[derive(Debug)]
pub struct ApiError(pub VendorHiveError);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            VendorHiveError::Validation(_) | VendorHiveError::Conflict(_) => StatusCode::BAD_REQUEST,
            VendorHiveError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            VendorHiveError::Forbidden(_) => StatusCode::FORBIDDEN,
            VendorHiveError::NotFound { .. } => StatusCode::NOT_FOUND,
            VendorHiveError::Storage(_)
            | VendorHiveError::Media(_)
            | VendorHiveError::Config(_)
            | VendorHiveError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<VendorHiveError> for ApiError {
    fn from(err: VendorHiveError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details stay in the log
        let message = if self.0.is_internal() {
            tracing::error!("❌ Request failed: {:#}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = ErrorBody {
            message,
            error: self.0.code(),
        };
        (status, Json(body)).into_response()
    }
}
