use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::expiry::{self, ListingStatus};
use crate::listing::query::{ListingFilter, SearchResult};
use crate::listing::repository::{ListingPatch, ListingRepository, NewListing};
use crate::media::{self, MediaStorage};
use crate::pagination::Pagination;
use models::listing::{self, images_from_json, Model};

/// Blob-store folder for listing images.
const IMAGE_FOLDER: &str = "services";

/// Fields accepted when creating a listing. `images` carries base64 payloads
/// (raw or data-URI); only the uploaded URLs are persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateListingInput {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category_id: Uuid,
    pub location: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub contact_number: String,
    pub contact_email: String,
}

/// Partial update. Absent fields are left untouched; `images: Some(..)`
/// replaces the whole image set (an empty list clears it).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateListingInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub images: Option<Vec<String>>,
    pub contact_number: Option<String>,
    pub contact_email: Option<String>,
}

/// Listing plus its derived expiry status, for owner-facing views.
#[derive(Debug, Serialize)]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: Model,
    pub status: ListingStatus,
    pub minutes_left: i64,
}

impl ListingView {
    pub fn from_model(listing: Model, now: DateTime<Utc>) -> Self {
        let expires_at = listing.expires_at.with_timezone(&Utc);
        Self {
            status: expiry::classify(expires_at, now),
            minutes_left: expiry::minutes_left(expires_at, now),
            listing,
        }
    }
}

/// The only mutation path for listings: validates inputs, brokers image
/// batches through the blob store and owns the lifecycle timestamps.
pub struct ListingService<R: ListingRepository> {
    repo: Arc<R>,
    media: Arc<dyn MediaStorage>,
    ttl: Duration,
}

impl<R: ListingRepository> ListingService<R> {
    pub fn new(repo: Arc<R>, media: Arc<dyn MediaStorage>, ttl_minutes: i64) -> Self {
        Self { repo, media, ttl: Duration::minutes(ttl_minutes) }
    }

    #[instrument(skip(self, input), fields(owner_id = %owner_id))]
    pub async fn create(&self, owner_id: Uuid, input: CreateListingInput) -> Result<Model, ServiceError> {
        self.sweep_best_effort(Utc::now()).await;

        listing::validate_title(&input.title)?;
        listing::validate_description(&input.description)?;
        listing::validate_price(input.price)?;
        listing::validate_location(&input.location)?;
        listing::validate_contact_number(&input.contact_number)?;
        listing::validate_contact_email(&input.contact_email)?;
        listing::validate_image_count(input.images.len())?;

        // Decode everything up front so a malformed payload fails the create
        // before any byte reaches the blob store.
        let mut payloads = Vec::with_capacity(input.images.len());
        for p in &input.images {
            payloads.push(media::decode_payload(p)?);
        }
        let urls = self.upload_all_or_nothing(payloads).await?;

        let now = Utc::now();
        let created = self
            .repo
            .insert(NewListing {
                id: Uuid::new_v4(),
                owner_id,
                title: input.title,
                description: input.description,
                price: input.price,
                category_id: input.category_id,
                location: input.location,
                images: urls,
                contact_number: input.contact_number,
                contact_email: input.contact_email,
                expires_at: now + self.ttl,
                created_at: now,
            })
            .await?;
        info!(id = %created.id, category_id = %created.category_id, "listing_created");
        Ok(created)
    }

    #[instrument(skip(self, input), fields(id = %id, owner_id = %owner_id))]
    pub async fn update(&self, id: Uuid, owner_id: Uuid, input: UpdateListingInput) -> Result<Model, ServiceError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("listing"))?;
        if existing.owner_id != owner_id {
            return Err(ServiceError::Forbidden("only the owner can modify this listing".into()));
        }

        if let Some(title) = &input.title {
            listing::validate_title(title)?;
        }
        if let Some(description) = &input.description {
            listing::validate_description(description)?;
        }
        if let Some(price) = input.price {
            listing::validate_price(price)?;
        }
        if let Some(location) = &input.location {
            listing::validate_location(location)?;
        }
        if let Some(number) = &input.contact_number {
            listing::validate_contact_number(number)?;
        }
        if let Some(email) = &input.contact_email {
            listing::validate_contact_email(email)?;
        }

        let mut patch = ListingPatch {
            title: input.title,
            description: input.description,
            price: input.price,
            location: input.location,
            contact_number: input.contact_number,
            contact_email: input.contact_email,
            images: None,
        };

        if let Some(payloads) = input.images {
            listing::validate_image_count(payloads.len())?;
            // Replaced blobs go first; a failed delete is logged, never
            // surfaced. Unlike create, a failed upload only drops that
            // entry: post-creation a listing tolerates a partial image set.
            let old = images_from_json(&existing.images);
            let deletions = join_all(old.iter().map(|u| self.media.delete(u))).await;
            for (url, res) in old.iter().zip(deletions) {
                if let Err(e) = res {
                    warn!(%url, error = %e, "failed to delete replaced image");
                }
            }
            patch.images = Some(self.upload_drop_failed(payloads).await);
        }

        let updated = self.repo.update_fields(id, patch, Utc::now()).await?;
        info!("listing_updated");
        Ok(updated)
    }

    #[instrument(skip(self), fields(id = %id, owner_id = %owner_id))]
    pub async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<(), ServiceError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("listing"))?;
        if existing.owner_id != owner_id {
            return Err(ServiceError::Forbidden("only the owner can delete this listing".into()));
        }

        let images = images_from_json(&existing.images);
        let deletions = join_all(images.iter().map(|u| self.media.delete(u))).await;
        for (url, res) in images.iter().zip(deletions) {
            if let Err(e) = res {
                warn!(%url, error = %e, "failed to delete listing image");
            }
        }

        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("listing"));
        }
        info!("listing_deleted");
        Ok(())
    }

    /// Reset the validity window. Intentionally does not check ownership:
    /// the source system lets any authenticated caller renew any listing.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn renew(&self, id: Uuid) -> Result<Model, ServiceError> {
        let now = Utc::now();
        let renewed = self.repo.renew(id, now + self.ttl, now).await?;
        info!(expires_at = %renewed.expires_at, "listing_renewed");
        Ok(renewed)
    }

    /// Reconcile the cached `is_active` flag with `expires_at`. Returns the
    /// number of rows flipped. Idempotent and safe to run concurrently.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, ServiceError> {
        self.repo.deactivate_expired(now).await
    }

    /// Sweep variant for read paths: staleness is preferred over
    /// unavailability, so failures are logged and swallowed.
    async fn sweep_best_effort(&self, now: DateTime<Utc>) {
        match self.repo.deactivate_expired(now).await {
            Ok(swept) if swept > 0 => info!(swept, "expired listings deactivated"),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "expiry sweep failed; proceeding with possibly stale flags"),
        }
    }

    /// Filtered, paginated view over the active set, plus facets computed
    /// over the whole active set.
    pub async fn search(&self, filter: &ListingFilter, page: Pagination) -> Result<SearchResult, ServiceError> {
        let now = Utc::now();
        self.sweep_best_effort(now).await;
        let (items, total) = self.repo.search(filter, page, now).await?;
        let facets = self.repo.facets(now).await?;
        Ok(SearchResult { items, total, facets })
    }

    /// Every listing of one owner regardless of state, with derived status
    /// so callers can render expiry badges and renewal prompts.
    pub async fn owner_listings(&self, owner_id: Uuid) -> Result<Vec<ListingView>, ServiceError> {
        let now = Utc::now();
        self.sweep_best_effort(now).await;
        let rows = self.repo.list_by_owner(owner_id).await?;
        Ok(rows.into_iter().map(|m| ListingView::from_model(m, now)).collect())
    }

    /// Active listings in one category, most recent first.
    pub async fn by_category(&self, category_id: Uuid) -> Result<Vec<Model>, ServiceError> {
        let now = Utc::now();
        self.sweep_best_effort(now).await;
        self.repo.list_active_by_category(category_id, now).await
    }

    async fn upload_all_or_nothing(&self, payloads: Vec<Vec<u8>>) -> Result<Vec<String>, ServiceError> {
        let results = join_all(payloads.into_iter().map(|data| self.media.upload(data, IMAGE_FOLDER))).await;
        let mut urls = Vec::with_capacity(results.len());
        let mut first_err = None;
        for res in results {
            match res {
                Ok(url) => urls.push(url),
                Err(e) => {
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
        }
        if let Some(err) = first_err {
            // All-or-nothing: roll back the siblings that made it.
            for url in &urls {
                if let Err(e) = self.media.delete(url).await {
                    warn!(%url, error = %e, "failed to roll back uploaded image");
                }
            }
            return Err(err);
        }
        Ok(urls)
    }

    async fn upload_drop_failed(&self, payloads: Vec<String>) -> Vec<String> {
        let mut decoded = Vec::new();
        for p in &payloads {
            match media::decode_payload(p) {
                Ok(bytes) => decoded.push(bytes),
                Err(e) => warn!(error = %e, "dropping undecodable image payload"),
            }
        }
        let results = join_all(decoded.into_iter().map(|data| self.media.upload(data, IMAGE_FOLDER))).await;
        results
            .into_iter()
            .filter_map(|res| match res {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(error = %e, "dropping failed image upload");
                    None
                }
            })
            .collect()
    }
}
