use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct CreateListingRequest {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category_id: Uuid,
    pub location: String,
    /// Up to 3 base64 image payloads (raw or data-URI).
    pub images: Vec<String>,
    pub contact_number: String,
    pub contact_email: String,
}

#[derive(utoipa::ToSchema)]
pub struct UpdateListingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub images: Option<Vec<String>>,
    pub contact_number: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub logo: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub logo: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct CreateContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: String,
    pub message: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::services::create,
        crate::routes::services::list,
        crate::routes::services::by_owner,
        crate::routes::services::update,
        crate::routes::services::delete,
        crate::routes::services::renew,
        crate::routes::services::by_category,
        crate::routes::categories::create,
        crate::routes::categories::list,
        crate::routes::categories::get,
        crate::routes::categories::update,
        crate::routes::categories::delete,
        crate::routes::contacts::create,
        crate::routes::contacts::list,
        crate::routes::contacts::get,
        crate::routes::contacts::delete,
    ),
    components(
        schemas(
            HealthResponse,
            CreateListingRequest,
            UpdateListingRequest,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CreateContactRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "services"),
        (name = "categories"),
        (name = "contacts")
    )
)]
pub struct ApiDoc;
