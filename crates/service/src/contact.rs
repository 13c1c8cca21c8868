//! Contact messages left by visitors for service providers.

use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;
use models::contact_message;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContactInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: String,
    pub message: Option<String>,
}

pub async fn create_contact(
    db: &DatabaseConnection,
    input: CreateContactInput,
    user_id: Option<Uuid>,
) -> Result<contact_message::Model, ServiceError> {
    let created = contact_message::create(db, input.name, input.email, &input.phone, input.message, user_id).await?;
    info!(id = %created.id, "contact_message_created");
    Ok(created)
}

pub async fn list_contacts(db: &DatabaseConnection) -> Result<Vec<contact_message::Model>, ServiceError> {
    contact_message::Entity::find()
        .order_by_desc(contact_message::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

pub async fn get_contact(db: &DatabaseConnection, id: Uuid) -> Result<Option<contact_message::Model>, ServiceError> {
    contact_message::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

pub async fn delete_contact(db: &DatabaseConnection, id: Uuid) -> Result<bool, ServiceError> {
    let res = contact_message::Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}
