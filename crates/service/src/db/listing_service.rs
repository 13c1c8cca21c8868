//! SeaORM-backed listing persistence.
//!
//! The active-set predicate always pairs the cached `is_active` flag with a
//! live `expires_at > now` check: the flag is only a denormalized cache and
//! a row that lapsed since the last sweep must never be served.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::listing::query::{Facets, ListingFilter, DEFAULT_PRICE_RANGE};
use crate::listing::repository::{ListingPatch, NewListing};
use crate::pagination::Pagination;
use models::listing;

fn db_err(e: sea_orm::DbErr) -> ServiceError {
    ServiceError::Db(e.to_string())
}

fn active_condition(now: DateTime<Utc>) -> Condition {
    Condition::all()
        .add(listing::Column::IsActive.eq(true))
        .add(listing::Column::ExpiresAt.gt(now))
}

/// Escape LIKE wildcards in user input, then wrap for substring matching.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

pub async fn insert(db: &DatabaseConnection, new: NewListing) -> Result<listing::Model, ServiceError> {
    let am = listing::ActiveModel {
        id: Set(new.id),
        owner_id: Set(new.owner_id),
        title: Set(new.title),
        description: Set(new.description),
        price: Set(new.price),
        category_id: Set(new.category_id),
        location: Set(new.location),
        images: Set(listing::images_to_json(&new.images)),
        contact_number: Set(new.contact_number),
        contact_email: Set(new.contact_email),
        is_active: Set(true),
        expires_at: Set(new.expires_at.into()),
        created_at: Set(new.created_at.into()),
        updated_at: Set(new.created_at.into()),
    };
    am.insert(db).await.map_err(db_err)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<listing::Model>, ServiceError> {
    listing::Entity::find_by_id(id).one(db).await.map_err(db_err)
}

pub async fn update_fields(
    db: &DatabaseConnection,
    id: Uuid,
    patch: ListingPatch,
    now: DateTime<Utc>,
) -> Result<listing::Model, ServiceError> {
    let mut am: listing::ActiveModel = listing::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ServiceError::not_found("listing"))?
        .into();
    if let Some(title) = patch.title {
        am.title = Set(title);
    }
    if let Some(description) = patch.description {
        am.description = Set(description);
    }
    if let Some(price) = patch.price {
        am.price = Set(price);
    }
    if let Some(location) = patch.location {
        am.location = Set(location);
    }
    if let Some(number) = patch.contact_number {
        am.contact_number = Set(number);
    }
    if let Some(email) = patch.contact_email {
        am.contact_email = Set(email);
    }
    if let Some(images) = patch.images {
        am.images = Set(listing::images_to_json(&images));
    }
    am.updated_at = Set(now.into());
    am.update(db).await.map_err(db_err)
}

pub async fn renew(
    db: &DatabaseConnection,
    id: Uuid,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<listing::Model, ServiceError> {
    let mut am: listing::ActiveModel = listing::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ServiceError::not_found("listing"))?
        .into();
    am.is_active = Set(true);
    am.expires_at = Set(expires_at.into());
    am.updated_at = Set(now.into());
    am.update(db).await.map_err(db_err)
}

pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<bool, ServiceError> {
    let res = listing::Entity::delete_by_id(id).exec(db).await.map_err(db_err)?;
    Ok(res.rows_affected > 0)
}

pub async fn list_by_owner(db: &DatabaseConnection, owner_id: Uuid) -> Result<Vec<listing::Model>, ServiceError> {
    listing::Entity::find()
        .filter(listing::Column::OwnerId.eq(owner_id))
        .order_by_desc(listing::Column::CreatedAt)
        .all(db)
        .await
        .map_err(db_err)
}

pub async fn list_active_by_category(
    db: &DatabaseConnection,
    category_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Vec<listing::Model>, ServiceError> {
    listing::Entity::find()
        .filter(active_condition(now).add(listing::Column::CategoryId.eq(category_id)))
        .order_by_desc(listing::Column::CreatedAt)
        .all(db)
        .await
        .map_err(db_err)
}

/// Lazy expiry sweep: flip the cached flag for every lapsed row. Setting an
/// already-false flag is a no-op, so concurrent sweeps commute.
pub async fn deactivate_expired(db: &DatabaseConnection, now: DateTime<Utc>) -> Result<u64, ServiceError> {
    let res = listing::Entity::update_many()
        .col_expr(listing::Column::IsActive, Expr::value(false))
        .filter(
            Condition::all()
                .add(listing::Column::IsActive.eq(true))
                .add(listing::Column::ExpiresAt.lte(now)),
        )
        .exec(db)
        .await
        .map_err(db_err)?;
    Ok(res.rows_affected)
}

pub async fn search(
    db: &DatabaseConnection,
    filter: &ListingFilter,
    page: Pagination,
    now: DateTime<Utc>,
) -> Result<(Vec<listing::Model>, u64), ServiceError> {
    let mut cond = active_condition(now);
    if let Some(category) = filter.category {
        cond = cond.add(listing::Column::CategoryId.eq(category));
    }
    if let Some(min) = filter.min_price {
        cond = cond.add(listing::Column::Price.gte(min));
    }
    if let Some(max) = filter.max_price {
        cond = cond.add(listing::Column::Price.lte(max));
    }
    if let Some(location) = &filter.location {
        cond = cond.add(Expr::col(listing::Column::Location).ilike(like_pattern(location)));
    }
    if let Some(term) = &filter.search {
        let pattern = like_pattern(term);
        cond = cond.add(
            Condition::any()
                .add(Expr::col(listing::Column::Title).ilike(pattern.clone()))
                .add(Expr::col(listing::Column::Description).ilike(pattern)),
        );
    }

    let (page_idx, per_page) = page.normalize();
    let paginator = listing::Entity::find()
        .filter(cond)
        .order_by_desc(listing::Column::CreatedAt)
        .paginate(db, per_page);
    let total = paginator.num_items().await.map_err(db_err)?;
    let items = paginator.fetch_page(page_idx).await.map_err(db_err)?;
    Ok((items, total))
}

/// Facets over the whole active set, independent of the current filter.
pub async fn facets(db: &DatabaseConnection, now: DateTime<Utc>) -> Result<Facets, ServiceError> {
    let categories: Vec<Uuid> = listing::Entity::find()
        .select_only()
        .column(listing::Column::CategoryId)
        .distinct()
        .filter(active_condition(now))
        .into_tuple()
        .all(db)
        .await
        .map_err(db_err)?;

    let locations: Vec<String> = listing::Entity::find()
        .select_only()
        .column(listing::Column::Location)
        .distinct()
        .filter(active_condition(now))
        .into_tuple()
        .all(db)
        .await
        .map_err(db_err)?;

    let prices: Vec<f64> = listing::Entity::find()
        .select_only()
        .column(listing::Column::Price)
        .filter(active_condition(now))
        .into_tuple()
        .all(db)
        .await
        .map_err(db_err)?;

    let price_range = if prices.is_empty() {
        DEFAULT_PRICE_RANGE
    } else {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for p in prices {
            min = min.min(p);
            max = max.max(p);
        }
        [min, max]
    };

    Ok(Facets { categories, locations, price_range })
}
