use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::errors;

/// Hard cap on stored image references per listing.
pub const MAX_IMAGES: usize = 3;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listing")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category_id: Uuid,
    pub location: String,
    /// JSON array of image URLs, insertion order preserved.
    #[sea_orm(column_type = "JsonBinary")]
    pub images: Json,
    pub contact_number: String,
    pub contact_email: String,
    /// Denormalized activity flag, reconciled lazily by the sweep. Reads
    /// must recompute activity from `expires_at`.
    pub is_active: bool,
    pub expires_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_title(title: &str) -> Result<(), errors::ModelError> {
    if title.trim().is_empty() {
        return Err(errors::ModelError::Validation("title is required".into()));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), errors::ModelError> {
    if description.trim().is_empty() {
        return Err(errors::ModelError::Validation("description is required".into()));
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), errors::ModelError> {
    if !price.is_finite() || price < 0.0 {
        return Err(errors::ModelError::Validation("price must be a non-negative number".into()));
    }
    Ok(())
}

pub fn validate_location(location: &str) -> Result<(), errors::ModelError> {
    if location.trim().is_empty() {
        return Err(errors::ModelError::Validation("location is required".into()));
    }
    Ok(())
}

pub fn validate_contact_number(number: &str) -> Result<(), errors::ModelError> {
    if number.trim().is_empty() {
        return Err(errors::ModelError::Validation("contact number is required".into()));
    }
    Ok(())
}

pub fn validate_contact_email(email: &str) -> Result<(), errors::ModelError> {
    if !email.contains('@') {
        return Err(errors::ModelError::Validation("invalid contact email".into()));
    }
    Ok(())
}

pub fn validate_image_count(count: usize) -> Result<(), errors::ModelError> {
    if count > MAX_IMAGES {
        return Err(errors::ModelError::Validation(format!(
            "you can only upload up to {} images",
            MAX_IMAGES
        )));
    }
    Ok(())
}

/// Encode image URLs into the stored JSON column.
pub fn images_to_json(urls: &[String]) -> Json {
    Json::Array(urls.iter().map(|u| Json::String(u.clone())).collect())
}

/// Decode the stored JSON column back into URLs. Non-string entries are
/// skipped rather than failing the whole row.
pub fn images_from_json(value: &Json) -> Vec<String> {
    match value {
        Json::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_rejects_negative_and_nan() {
        assert!(validate_price(-0.01).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(149.99).is_ok());
    }

    #[test]
    fn image_count_capped_at_three() {
        assert!(validate_image_count(0).is_ok());
        assert!(validate_image_count(3).is_ok());
        assert!(validate_image_count(4).is_err());
    }

    #[test]
    fn images_round_trip_preserves_order() {
        let urls = vec!["/uploads/a.png".to_string(), "/uploads/b.png".to_string()];
        let json = images_to_json(&urls);
        assert_eq!(images_from_json(&json), urls);
    }

    #[test]
    fn images_from_json_ignores_non_strings() {
        let json = serde_json::json!(["/uploads/a.png", 42, null]);
        assert_eq!(images_from_json(&json), vec!["/uploads/a.png".to_string()]);
    }
}
