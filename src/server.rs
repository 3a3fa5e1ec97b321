use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::state::SharedState;

pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(crate::routes::health::health))
        // Cached read surface
        .route("/overview", get(crate::routes::overview::overview))
        .route("/overview/daily", get(crate::routes::overview::daily))
        .route("/results", get(crate::routes::results::list))
        .route("/worker", get(crate::routes::worker::worker))
        .route("/diagnostics", get(crate::routes::diagnostics::diagnostics))
        // Projects
        .route(
            "/projects",
            get(crate::routes::projects::list).post(crate::routes::projects::create),
        )
        .route("/projects/{id}", get(crate::routes::projects::detail))
        // Cases
        .route(
            "/projects/{id}/cases",
            get(crate::routes::cases::list).post(crate::routes::cases::create),
        )
        .route(
            "/cases/{id}",
            put(crate::routes::cases::update).delete(crate::routes::cases::delete),
        )
        // Jobs
        .route("/jobs", post(crate::routes::jobs::queue))
        .layer(cors)
        .with_state(state)
}
