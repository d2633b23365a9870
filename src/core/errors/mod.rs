// Copyright 2025 Vijaykumar Singh
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Error types for VendorHive
//!
//! `VendorHiveError` is the single error type shared by the storage backends and
//! the service layer. The REST layer maps each variant to an HTTP status.

pub mod config_error;
pub mod core_error;

// Re-export all error types
pub use config_error::*;
pub use core_error::*;
