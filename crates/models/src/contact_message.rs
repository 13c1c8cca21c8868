use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contact_message")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: String,
    pub message: Option<String>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_phone(phone: &str) -> Result<(), errors::ModelError> {
    let digits = phone.trim();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(errors::ModelError::Validation("please provide a valid phone number".into()));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    name: Option<String>,
    email: Option<String>,
    phone: &str,
    message: Option<String>,
    user_id: Option<Uuid>,
) -> Result<Model, errors::ModelError> {
    validate_phone(phone)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        phone: Set(phone.trim().to_string()),
        message: Set(message),
        user_id: Set(user_id),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::validate_phone;

    #[test]
    fn phone_must_be_digits_only() {
        assert!(validate_phone("0123456789").is_ok());
        assert!(validate_phone("01234-5678").is_err());
        assert!(validate_phone("").is_err());
    }
}
