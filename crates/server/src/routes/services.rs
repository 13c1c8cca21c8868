use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::{CurrentUser, ServerState};
use crate::errors::JsonApiError;
use service::listing::{
    CreateListingInput, ListingFilter, ListingService, ListingView, SearchResult,
    SeaOrmListingRepository, UpdateListingInput,
};
use service::pagination::Pagination;

/// Request-scoped lifecycle service over the shared connection pool.
fn listing_service(state: &ServerState) -> ListingService<SeaOrmListingRepository> {
    ListingService::new(
        Arc::new(SeaOrmListingRepository { db: state.db.clone() }),
        state.media.clone(),
        state.listing_ttl_minutes,
    )
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    pub category: Option<Uuid>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub location: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[utoipa::path(
    post, path = "/services", tag = "services",
    request_body = crate::openapi::CreateListingRequest,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Storage Error")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(input): Json<CreateListingInput>,
) -> Result<(StatusCode, Json<models::listing::Model>), JsonApiError> {
    let created = listing_service(&state).create(user.id, input).await?;
    info!(id = %created.id, owner_id = %user.id, "created listing");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/services", tag = "services",
    params(ListQuery),
    responses(
        (status = 200, description = "Matches plus facets"),
        (status = 400, description = "Malformed query parameter")
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<SearchResult>, JsonApiError> {
    let filter = ListingFilter {
        category: q.category,
        min_price: q.min_price,
        max_price: q.max_price,
        location: q.location,
        search: q.search,
    };
    let page = Pagination { page: q.page.unwrap_or(1), limit: q.limit.unwrap_or(10) };
    let result = listing_service(&state).search(&filter, page).await?;
    info!(total = result.total, "list listings");
    Ok(Json(result))
}

#[utoipa::path(
    get, path = "/services/user/{user_id}", tag = "services",
    params(("user_id" = Uuid, Path, description = "Listing owner")),
    responses(
        (status = 200, description = "Owner's listings with expiry status"),
        (status = 400, description = "Invalid id"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn by_owner(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<ListingView>>, JsonApiError> {
    let views = listing_service(&state).owner_listings(user_id).await?;
    Ok(Json(views))
}

#[utoipa::path(
    put, path = "/services/{id}", tag = "services",
    params(("id" = Uuid, Path, description = "Listing ID")),
    request_body = crate::openapi::UpdateListingRequest,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateListingInput>,
) -> Result<Json<models::listing::Model>, JsonApiError> {
    let updated = listing_service(&state).update(id, user.id, input).await?;
    info!(id = %updated.id, "updated listing");
    Ok(Json(updated))
}

#[utoipa::path(
    delete, path = "/services/{id}", tag = "services",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, JsonApiError> {
    listing_service(&state).delete(id, user.id).await?;
    info!(%id, "deleted listing");
    Ok(Json(serde_json::json!({ "message": "service deleted successfully" })))
}

#[utoipa::path(
    put, path = "/services/{id}/renew", tag = "services",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Renewed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn renew(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<models::listing::Model>, JsonApiError> {
    let renewed = listing_service(&state).renew(id).await?;
    info!(id = %renewed.id, expires_at = %renewed.expires_at, "renewed listing");
    Ok(Json(renewed))
}

#[utoipa::path(
    get, path = "/services/category/{id}", tag = "services",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Active listings in the category")
    )
)]
pub async fn by_category(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<models::listing::Model>>, JsonApiError> {
    let rows = listing_service(&state).by_category(id).await?;
    Ok(Json(rows))
}
