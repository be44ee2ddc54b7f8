pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::coaching::handlers as coaching;
use crate::matching::handlers as matching;
use crate::resume::handlers as resume;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/reset",
            post(session::handle_reset_session),
        )
        // Résumé
        .route(
            "/api/v1/sessions/:id/resume",
            post(resume::handle_upload_resume).get(resume::handle_get_resume),
        )
        .route("/api/v1/sessions/:id/preview", post(resume::handle_preview))
        // Matching
        .route(
            "/api/v1/sessions/:id/analysis",
            post(matching::handle_analysis),
        )
        .route("/api/v1/sessions/:id/compare", post(matching::handle_compare))
        // Coaching
        .route(
            "/api/v1/sessions/:id/roadmap",
            post(coaching::handle_roadmap),
        )
        .route(
            "/api/v1/sessions/:id/mentor",
            get(coaching::handle_get_transcript).post(coaching::handle_mentor),
        )
        // Application tracker
        .route(
            "/api/v1/sessions/:id/applications",
            get(session::handle_list_applications).post(session::handle_add_application),
        )
        .route(
            "/api/v1/sessions/:id/applications/:app_id",
            patch(session::handle_move_application).delete(session::handle_delete_application),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
