use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::auth::{AdminUser, OptionalUser, ServerState};
use crate::errors::JsonApiError;
use service::contact::{self, CreateContactInput};

#[utoipa::path(
    post, path = "/contacts", tag = "contacts",
    request_body = crate::openapi::CreateContactRequest,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    OptionalUser(user): OptionalUser,
    Json(input): Json<CreateContactInput>,
) -> Result<(StatusCode, Json<models::contact_message::Model>), JsonApiError> {
    let created = contact::create_contact(&state.db, input, user.map(|u| u.id)).await?;
    info!(id = %created.id, "created contact message");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/contacts", tag = "contacts",
    responses(
        (status = 200, description = "All contact messages, newest first"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    _admin: AdminUser,
) -> Result<Json<Vec<models::contact_message::Model>>, JsonApiError> {
    let messages = contact::list_contacts(&state.db).await?;
    Ok(Json(messages))
}

#[utoipa::path(
    get, path = "/contacts/{id}", tag = "contacts",
    params(("id" = Uuid, Path, description = "Contact message ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<models::contact_message::Model>, JsonApiError> {
    match contact::get_contact(&state.db, id).await? {
        Some(message) => Ok(Json(message)),
        None => Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some("contact message not found".into()))),
    }
}

#[utoipa::path(
    delete, path = "/contacts/{id}", tag = "contacts",
    params(("id" = Uuid, Path, description = "Contact message ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, JsonApiError> {
    if !contact::delete_contact(&state.db, id).await? {
        return Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some("contact message not found".into())));
    }
    info!(%id, "deleted contact message");
    Ok(Json(serde_json::json!({ "message": "contact message deleted" })))
}
