use axum::{
    routing::{get, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::auth::ServerState;

pub mod categories;
pub mod contacts;
pub mod services;

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public browse routes, owner-scoped
/// mutations, admin reference data, uploaded media and API docs.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let media = ServeDir::new(&state.upload_dir);
    let media_prefix = state.media_prefix.clone();

    let api = Router::new()
        .route("/health", get(health))
        .route("/services", get(services::list).post(services::create))
        .route("/services/user/:user_id", get(services::by_owner))
        .route("/services/category/:id", get(services::by_category))
        .route("/services/:id", put(services::update).delete(services::delete))
        .route("/services/:id/renew", put(services::renew))
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/:id",
            get(categories::get).put(categories::update).delete(categories::delete),
        )
        .route("/contacts", get(contacts::list).post(contacts::create))
        .route("/contacts/:id", get(contacts::get).delete(contacts::delete))
        .with_state(state);

    api.nest_service(&media_prefix, media)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", crate::openapi::ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
