pub mod certificates;
pub mod middleware;
pub mod rest;
pub mod rosters;
pub mod state;
pub mod viewers;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

pub use middleware::require_token;
pub use state::AppState;

/// Builds the API router. Certificate verification and the health check are
/// public; everything else needs a bearer token.
pub fn router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/certificates/verify/{certificate_id}",
            get(certificates::verify_certificate_handler),
        );

    let protected_routes = Router::new()
        .route("/viewers", post(viewers::create_viewer_handler))
        .route(
            "/viewers/{id}",
            get(viewers::get_viewer_handler).delete(viewers::delete_viewer_handler),
        )
        .route("/viewers/{id}/select", post(viewers::select_lesson_handler))
        .route("/viewers/{id}/complete", post(viewers::complete_lesson_handler))
        .route("/viewers/{id}/watch-time", post(viewers::watch_time_handler))
        .route("/viewers/{id}/certificate", post(viewers::issue_certificate_handler))
        .route("/rosters", post(rosters::create_roster_handler))
        .route(
            "/rosters/{id}",
            get(rosters::get_roster_handler).delete(rosters::delete_roster_handler),
        )
        .route("/rosters/{id}/attendance", put(rosters::set_attendance_handler))
        .route("/rosters/{id}/fill", post(rosters::fill_roster_handler))
        .route("/rosters/{id}/slots/{index}", put(rosters::set_slot_handler))
        .route("/rosters/{id}/message", post(rosters::generate_message_handler))
        .route("/rosters/{id}/image", get(rosters::roster_image_handler))
        .route("/rosters/{id}/reset", post(rosters::reset_roster_handler))
        .layer(axum_middleware::from_fn(require_token));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
