use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use service::errors::ServiceError;

/// JSON error envelope: a short title plus an optional human-readable
/// detail. Internals (queries, stack traces) never leave the boundary.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail }
    }

    /// Map the service taxonomy onto HTTP statuses.
    pub fn from_service(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg)),
            ServiceError::Model(inner) => match inner {
                models::errors::ModelError::Validation(msg) => {
                    Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg))
                }
                models::errors::ModelError::Db(msg) => {
                    error!(error = %msg, "model database failure");
                    Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
                }
            },
            ServiceError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            ServiceError::Forbidden(msg) => Self::new(StatusCode::FORBIDDEN, "Forbidden", Some(msg)),
            ServiceError::Storage(msg) => {
                error!(error = %msg, "blob store failure");
                Self::new(StatusCode::BAD_GATEWAY, "Storage Error", Some("image storage is unavailable".into()))
            }
            ServiceError::Dependency(msg) => {
                error!(error = %msg, "dependency failure");
                Self::new(StatusCode::BAD_GATEWAY, "Dependency Error", None)
            }
            ServiceError::Db(msg) => {
                error!(error = %msg, "database failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
            }
        }
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        Self::from_service(e)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = match self.detail {
            Some(detail) => serde_json::json!({ "error": self.title, "detail": detail }),
            None => serde_json::json!({ "error": self.title }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_expected_statuses() {
        let cases = [
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ServiceError::Storage("x".into()), StatusCode::BAD_GATEWAY),
            (ServiceError::Db("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from_service(err).status, status);
        }
    }

    #[test]
    fn database_detail_is_not_exposed() {
        let mapped = JsonApiError::from_service(ServiceError::Db("SELECT * FROM listing".into()));
        assert!(mapped.detail.is_none());
    }
}
