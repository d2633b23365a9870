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

//! Property tests for vendor rating aggregation

use proptest::prelude::*;

use vendorhive::core::{NewReview, NewUser, NewVendor, RatingAggregate, Role};
use vendorhive::storage::{MarketplaceStore, MemoryMarketplaceStore};

fn new_user(index: usize, role: Role) -> NewUser {
    NewUser {
        name: format!("User {}", index),
        username: format!("user{}", index),
        email: format!("user{}@example.com", index),
        password_hash: "hash".to_string(),
        role,
        profile_image: None,
        phone: None,
        bio: None,
        location: None,
    }
}

proptest! {
    #[test]
    fn rounded_mean_stays_within_half_a_star(ratings in prop::collection::vec(1i32..=5, 1..60)) {
        let aggregate = RatingAggregate::from_ratings(ratings.iter().copied());
        let mean = ratings.iter().map(|r| *r as f64).sum::<f64>() / ratings.len() as f64;
        let rounded = aggregate.rounded_mean();

        prop_assert!((1..=5).contains(&rounded));
        prop_assert!((rounded as f64 - mean).abs() <= 0.5);
        prop_assert_eq!(aggregate.count, ratings.len() as i64);
    }

    #[test]
    fn stored_rating_matches_aggregate(ratings in prop::collection::vec(1i32..=5, 1..12)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let vendor = runtime.block_on(async {
            let mut store = MemoryMarketplaceStore::new();
            store.initialize().await.unwrap();

            let owner = store.create_user(new_user(0, Role::Vendor)).await.unwrap();
            let vendor = store
                .create_vendor(NewVendor {
                    user_id: owner.id,
                    business_name: "Bloom Florals".to_string(),
                    category: "Flowers".to_string(),
                    description: String::new(),
                    services: Vec::new(),
                    business_hours: None,
                    cover_image: None,
                })
                .await
                .unwrap();

            let mut receipt = None;
            for (index, rating) in ratings.iter().enumerate() {
                let reviewer = store.create_user(new_user(index + 1, Role::User)).await.unwrap();
                receipt = Some(
                    store
                        .create_review(NewReview {
                            user_id: reviewer.id,
                            vendor_id: vendor.id,
                            rating: *rating,
                            comment: None,
                        })
                        .await
                        .unwrap(),
                );
            }

            let stored = store.get_vendor(vendor.id).await.unwrap().unwrap();
            assert_eq!(receipt.map(|r| r.vendor), Some(stored.clone()));
            stored
        });

        let expected = RatingAggregate::from_ratings(ratings.iter().copied());
        prop_assert_eq!(vendor.rating, expected.rounded_mean());
        prop_assert_eq!(vendor.review_count as i64, expected.count);
    }
}
