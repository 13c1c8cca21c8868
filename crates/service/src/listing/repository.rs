use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::listing::query::{Facets, ListingFilter};
use crate::pagination::Pagination;

/// Fully-resolved row ready for insertion: image payloads already uploaded,
/// lifecycle timestamps already computed by the service.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category_id: Uuid,
    pub location: String,
    pub images: Vec<String>,
    pub contact_number: String,
    pub contact_email: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Partial update: `None` leaves the stored field untouched. The owner,
/// id and lifecycle timestamps are never patchable.
#[derive(Debug, Clone, Default)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub contact_number: Option<String>,
    pub contact_email: Option<String>,
    pub images: Option<Vec<String>>,
}

/// Persistence abstraction for listings.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn insert(&self, new: NewListing) -> Result<models::listing::Model, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<models::listing::Model>, ServiceError>;
    async fn update_fields(&self, id: Uuid, patch: ListingPatch, now: DateTime<Utc>) -> Result<models::listing::Model, ServiceError>;
    async fn renew(&self, id: Uuid, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<models::listing::Model, ServiceError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<models::listing::Model>, ServiceError>;
    async fn list_active_by_category(&self, category_id: Uuid, now: DateTime<Utc>) -> Result<Vec<models::listing::Model>, ServiceError>;
    /// Flip `is_active` off for every lapsed row. Idempotent.
    async fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<u64, ServiceError>;
    async fn search(&self, filter: &ListingFilter, page: Pagination, now: DateTime<Utc>) -> Result<(Vec<models::listing::Model>, u64), ServiceError>;
    async fn facets(&self, now: DateTime<Utc>) -> Result<Facets, ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmListingRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl ListingRepository for SeaOrmListingRepository {
    async fn insert(&self, new: NewListing) -> Result<models::listing::Model, ServiceError> {
        crate::db::listing_service::insert(&self.db, new).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<models::listing::Model>, ServiceError> {
        crate::db::listing_service::find_by_id(&self.db, id).await
    }

    async fn update_fields(&self, id: Uuid, patch: ListingPatch, now: DateTime<Utc>) -> Result<models::listing::Model, ServiceError> {
        crate::db::listing_service::update_fields(&self.db, id, patch, now).await
    }

    async fn renew(&self, id: Uuid, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<models::listing::Model, ServiceError> {
        crate::db::listing_service::renew(&self.db, id, expires_at, now).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        crate::db::listing_service::delete(&self.db, id).await
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<models::listing::Model>, ServiceError> {
        crate::db::listing_service::list_by_owner(&self.db, owner_id).await
    }

    async fn list_active_by_category(&self, category_id: Uuid, now: DateTime<Utc>) -> Result<Vec<models::listing::Model>, ServiceError> {
        crate::db::listing_service::list_active_by_category(&self.db, category_id, now).await
    }

    async fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<u64, ServiceError> {
        crate::db::listing_service::deactivate_expired(&self.db, now).await
    }

    async fn search(&self, filter: &ListingFilter, page: Pagination, now: DateTime<Utc>) -> Result<(Vec<models::listing::Model>, u64), ServiceError> {
        crate::db::listing_service::search(&self.db, filter, page, now).await
    }

    async fn facets(&self, now: DateTime<Utc>) -> Result<Facets, ServiceError> {
        crate::db::listing_service::facets(&self.db, now).await
    }
}

/// Simple in-memory repository for tests and doc examples. Mirrors the SQL
/// predicates with iterator logic.
pub mod memory {
    use super::*;
    use crate::expiry;
    use crate::listing::query::{contains_ci, DEFAULT_PRICE_RANGE};
    use models::listing::{images_to_json, Model};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryListingRepository {
        rows: Mutex<Vec<Model>>,
    }

    impl InMemoryListingRepository {
        fn active_at(m: &Model, now: DateTime<Utc>) -> bool {
            m.is_active && !expiry::is_expired(m.expires_at.with_timezone(&Utc), now)
        }

        fn matches(m: &Model, filter: &ListingFilter, now: DateTime<Utc>) -> bool {
            if !Self::active_at(m, now) {
                return false;
            }
            if let Some(cat) = filter.category {
                if m.category_id != cat {
                    return false;
                }
            }
            if let Some(min) = filter.min_price {
                if m.price < min {
                    return false;
                }
            }
            if let Some(max) = filter.max_price {
                if m.price > max {
                    return false;
                }
            }
            if let Some(loc) = &filter.location {
                if !contains_ci(&m.location, loc) {
                    return false;
                }
            }
            if let Some(term) = &filter.search {
                if !contains_ci(&m.title, term) && !contains_ci(&m.description, term) {
                    return false;
                }
            }
            true
        }
    }

    #[async_trait]
    impl ListingRepository for InMemoryListingRepository {
        async fn insert(&self, new: NewListing) -> Result<Model, ServiceError> {
            let model = Model {
                id: new.id,
                owner_id: new.owner_id,
                title: new.title,
                description: new.description,
                price: new.price,
                category_id: new.category_id,
                location: new.location,
                images: images_to_json(&new.images),
                contact_number: new.contact_number,
                contact_email: new.contact_email,
                is_active: true,
                expires_at: new.expires_at.into(),
                created_at: new.created_at.into(),
                updated_at: new.created_at.into(),
            };
            self.rows.lock().unwrap().push(model.clone());
            Ok(model)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Model>, ServiceError> {
            Ok(self.rows.lock().unwrap().iter().find(|m| m.id == id).cloned())
        }

        async fn update_fields(&self, id: Uuid, patch: ListingPatch, now: DateTime<Utc>) -> Result<Model, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let m = rows
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or_else(|| ServiceError::not_found("listing"))?;
            if let Some(title) = patch.title {
                m.title = title;
            }
            if let Some(description) = patch.description {
                m.description = description;
            }
            if let Some(price) = patch.price {
                m.price = price;
            }
            if let Some(location) = patch.location {
                m.location = location;
            }
            if let Some(number) = patch.contact_number {
                m.contact_number = number;
            }
            if let Some(email) = patch.contact_email {
                m.contact_email = email;
            }
            if let Some(images) = patch.images {
                m.images = images_to_json(&images);
            }
            m.updated_at = now.into();
            Ok(m.clone())
        }

        async fn renew(&self, id: Uuid, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<Model, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let m = rows
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or_else(|| ServiceError::not_found("listing"))?;
            m.is_active = true;
            m.expires_at = expires_at.into();
            m.updated_at = now.into();
            Ok(m.clone())
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|m| m.id != id);
            Ok(rows.len() < before)
        }

        async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Model>, ServiceError> {
            let mut out: Vec<Model> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.owner_id == owner_id)
                .cloned()
                .collect();
            out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(out)
        }

        async fn list_active_by_category(&self, category_id: Uuid, now: DateTime<Utc>) -> Result<Vec<Model>, ServiceError> {
            let mut out: Vec<Model> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.category_id == category_id && Self::active_at(m, now))
                .cloned()
                .collect();
            out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(out)
        }

        async fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<u64, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let mut swept = 0;
            for m in rows.iter_mut() {
                if m.is_active && expiry::is_expired(m.expires_at.with_timezone(&Utc), now) {
                    m.is_active = false;
                    swept += 1;
                }
            }
            Ok(swept)
        }

        async fn search(&self, filter: &ListingFilter, page: Pagination, now: DateTime<Utc>) -> Result<(Vec<Model>, u64), ServiceError> {
            let mut matches: Vec<Model> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|m| Self::matches(m, filter, now))
                .cloned()
                .collect();
            matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            let total = matches.len() as u64;
            let (page_idx, per_page) = page.normalize();
            let items = matches
                .into_iter()
                .skip((page_idx * per_page) as usize)
                .take(per_page as usize)
                .collect();
            Ok((items, total))
        }

        async fn facets(&self, now: DateTime<Utc>) -> Result<Facets, ServiceError> {
            let rows = self.rows.lock().unwrap();
            let active: Vec<&Model> = rows.iter().filter(|m| Self::active_at(m, now)).collect();

            let mut categories: Vec<Uuid> = Vec::new();
            let mut locations: Vec<String> = Vec::new();
            for m in &active {
                if !categories.contains(&m.category_id) {
                    categories.push(m.category_id);
                }
                if !locations.contains(&m.location) {
                    locations.push(m.location.clone());
                }
            }

            let price_range = if active.is_empty() {
                DEFAULT_PRICE_RANGE
            } else {
                let mut min = f64::INFINITY;
                let mut max = f64::NEG_INFINITY;
                for m in &active {
                    min = min.min(m.price);
                    max = max.max(m.price);
                }
                [min, max]
            };

            Ok(Facets { categories, locations, price_range })
        }
    }
}
