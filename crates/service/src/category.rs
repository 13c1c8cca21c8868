//! Category registry: reference data consumed by listings.
//!
//! Mutations are admin-only (enforced at the HTTP boundary). Deleting a
//! category never cascades into listings; existing rows keep their
//! `category_id` and are surfaced as-is.

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::media::{self, MediaStorage};
use models::category;

/// Blob-store folder for category logos.
const LOGO_FOLDER: &str = "categories";

fn db_err(e: sea_orm::DbErr) -> ServiceError {
    ServiceError::Db(e.to_string())
}

pub async fn create_category(
    db: &DatabaseConnection,
    storage: &dyn MediaStorage,
    name: &str,
    logo_payload: Option<String>,
) -> Result<category::Model, ServiceError> {
    category::validate_name(name)?;

    let existing = category::Entity::find()
        .filter(category::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(db_err)?;
    if existing.is_some() {
        return Err(ServiceError::Validation("category name already exists".into()));
    }

    // Unlike listing updates, a failed logo upload fails the whole create.
    let logo = match logo_payload {
        Some(payload) => {
            let bytes = media::decode_payload(&payload)?;
            Some(storage.upload(bytes, LOGO_FOLDER).await?)
        }
        None => None,
    };

    let created = category::create(db, name, logo).await?;
    info!(id = %created.id, name = %created.name, "category_created");
    Ok(created)
}

pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>, ServiceError> {
    category::Entity::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(db_err)
}

pub async fn get_category(db: &DatabaseConnection, id: Uuid) -> Result<Option<category::Model>, ServiceError> {
    category::Entity::find_by_id(id).one(db).await.map_err(db_err)
}

pub async fn update_category(
    db: &DatabaseConnection,
    storage: &dyn MediaStorage,
    id: Uuid,
    name: Option<String>,
    logo_payload: Option<String>,
) -> Result<category::Model, ServiceError> {
    let existing = category::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ServiceError::not_found("category"))?;

    let new_logo = match logo_payload {
        Some(payload) => {
            // Replace the stored logo: old blob first, failures logged only.
            if let Some(old) = &existing.logo {
                if let Err(e) = storage.delete(old).await {
                    warn!(url = %old, error = %e, "failed to delete replaced category logo");
                }
            }
            let bytes = media::decode_payload(&payload)?;
            Some(storage.upload(bytes, LOGO_FOLDER).await?)
        }
        None => existing.logo.clone(),
    };

    let mut am: category::ActiveModel = existing.into();
    if let Some(name) = name {
        category::validate_name(&name)?;
        am.name = Set(name.trim().to_string());
    }
    am.logo = Set(new_logo);
    am.updated_at = Set(chrono::Utc::now().into());
    let updated = am.update(db).await.map_err(db_err)?;
    info!(id = %updated.id, "category_updated");
    Ok(updated)
}

pub async fn delete_category(
    db: &DatabaseConnection,
    storage: &dyn MediaStorage,
    id: Uuid,
) -> Result<(), ServiceError> {
    let existing = category::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ServiceError::not_found("category"))?;

    if let Some(logo) = &existing.logo {
        if let Err(e) = storage.delete(logo).await {
            warn!(url = %logo, error = %e, "failed to delete category logo");
        }
    }

    // No cascade: listings referencing this category keep their id.
    category::Entity::delete_by_id(id).exec(db).await.map_err(db_err)?;
    info!(id = %id, "category_deleted");
    Ok(())
}
