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

//! Persistence for marketplace records
//!
//! Route handlers never touch a backend directly; the service layer holds an
//! `Arc<dyn MarketplaceStore>` built once at startup by
//! [`MarketplaceStoreFactory`].

pub mod backends;

pub use backends::{
    memory_backend::MemoryMarketplaceStore, mongodb_backend::MongoMarketplaceStore,
    MarketplaceStore, MarketplaceStoreFactory,
};
