use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::{AdminUser, ServerState};
use crate::errors::JsonApiError;
use service::category as category_service;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateCategoryInput {
    pub name: String,
    /// Optional base64 logo payload, uploaded to the blob store.
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub logo: Option<String>,
}

#[utoipa::path(
    post, path = "/categories", tag = "categories",
    request_body = crate::openapi::CreateCategoryRequest,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    AdminUser(admin): AdminUser,
    Json(input): Json<CreateCategoryInput>,
) -> Result<(StatusCode, Json<models::category::Model>), JsonApiError> {
    let created =
        category_service::create_category(&state.db, state.media.as_ref(), &input.name, input.logo).await?;
    info!(id = %created.id, admin_id = %admin.id, "created category");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/categories", tag = "categories",
    responses((status = 200, description = "All categories"))
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<models::category::Model>>, JsonApiError> {
    let categories = category_service::list_categories(&state.db).await?;
    Ok(Json(categories))
}

#[utoipa::path(
    get, path = "/categories/{id}", tag = "categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<models::category::Model>, JsonApiError> {
    match category_service::get_category(&state.db, id).await? {
        Some(category) => Ok(Json(category)),
        None => Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some("category not found".into()))),
    }
}

#[utoipa::path(
    put, path = "/categories/{id}", tag = "categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = crate::openapi::UpdateCategoryRequest,
    responses(
        (status = 200, description = "Updated"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCategoryInput>,
) -> Result<Json<models::category::Model>, JsonApiError> {
    let updated =
        category_service::update_category(&state.db, state.media.as_ref(), id, input.name, input.logo).await?;
    info!(id = %updated.id, admin_id = %admin.id, "updated category");
    Ok(Json(updated))
}

#[utoipa::path(
    delete, path = "/categories/{id}", tag = "categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, JsonApiError> {
    category_service::delete_category(&state.db, state.media.as_ref(), id).await?;
    info!(%id, admin_id = %admin.id, "deleted category");
    Ok(Json(serde_json::json!({ "message": "category deleted successfully" })))
}
