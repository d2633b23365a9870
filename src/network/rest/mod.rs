// Copyright 2025 Vijaykumar Singh
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! REST API for the marketplace

pub mod error;
pub mod handlers;
pub mod server;
pub mod validation;

pub use error::{ApiError, ApiResult};
pub use handlers::{create_router, AppState};
pub use server::RestServer;
