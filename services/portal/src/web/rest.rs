//! services/portal/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification and the mapping from
//! core errors to HTTP responses shared by every handler.

use crate::web::state::SessionAccess;
use crate::web::{certificates, rosters, viewers};
use axum::http::StatusCode;
use ministry_core::ports::PortError;
use ministry_core::{RosterError, ViewerError};
use tracing::error;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        viewers::create_viewer_handler,
        viewers::get_viewer_handler,
        viewers::select_lesson_handler,
        viewers::complete_lesson_handler,
        viewers::watch_time_handler,
        viewers::issue_certificate_handler,
        viewers::delete_viewer_handler,
        certificates::verify_certificate_handler,
        rosters::create_roster_handler,
        rosters::get_roster_handler,
        rosters::set_attendance_handler,
        rosters::fill_roster_handler,
        rosters::set_slot_handler,
        rosters::generate_message_handler,
        rosters::roster_image_handler,
        rosters::reset_roster_handler,
        rosters::delete_roster_handler,
    ),
    components(
        schemas(
            viewers::CreateViewerRequest,
            viewers::SelectLessonRequest,
            viewers::WatchTimeRequest,
            viewers::ViewerSnapshot,
            viewers::ModuleView,
            viewers::LessonView,
            viewers::LessonStateView,
            viewers::PositionView,
            viewers::ProgressView,
            viewers::CompleteLessonResponse,
            viewers::CertificateResponse,
            certificates::VerificationResponse,
            rosters::CreateRosterRequest,
            rosters::AttendanceRequest,
            rosters::SlotRequest,
            rosters::RosterSnapshot,
            rosters::SlotView,
            rosters::MessageResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Ministry Portal API", description = "Course viewer and duty-roster composer.")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

pub type HandlerError = (StatusCode, String);

pub fn port_error(e: PortError) -> HandlerError {
    match e {
        PortError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Unexpected(reason) => {
            error!("Remote API call failed: {}", reason);
            (
                StatusCode::BAD_GATEWAY,
                "The platform API is unavailable, try again".to_string(),
            )
        }
    }
}

pub fn viewer_error(e: ViewerError) -> HandlerError {
    match e {
        ViewerError::Port(e) => port_error(e),
        ViewerError::LessonLocked => (StatusCode::FORBIDDEN, e.to_string()),
        ViewerError::NoSuchLesson(..) => (StatusCode::NOT_FOUND, e.to_string()),
        ViewerError::UntrackableLesson => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        ViewerError::NoCurrentLesson | ViewerError::CertificateUnavailable => {
            (StatusCode::CONFLICT, e.to_string())
        }
    }
}

pub fn roster_error(e: RosterError) -> HandlerError {
    match e {
        RosterError::NoSuchSlot(_) => (StatusCode::NOT_FOUND, e.to_string()),
        RosterError::NotAssignable(_) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
    }
}

pub fn session_error(e: SessionAccess, kind: &str) -> HandlerError {
    match e {
        SessionAccess::NotFound => (StatusCode::NOT_FOUND, format!("{kind} session not found")),
        SessionAccess::Forbidden => (
            StatusCode::FORBIDDEN,
            format!("{kind} session belongs to another user"),
        ),
        SessionAccess::Busy => (
            StatusCode::CONFLICT,
            format!("{kind} session is busy with another operation"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_map_to_terminal_or_transient_statuses() {
        assert_eq!(port_error(PortError::NotFound("course".into())).0, StatusCode::NOT_FOUND);
        assert_eq!(port_error(PortError::Unauthorized).0, StatusCode::UNAUTHORIZED);
        assert_eq!(
            port_error(PortError::Unexpected("timeout".into())).0,
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn viewer_errors_keep_their_message() {
        let (status, body) = viewer_error(ViewerError::LessonLocked);
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, "Complete the previous lesson to unlock this one");

        assert_eq!(
            viewer_error(ViewerError::CertificateUnavailable).0,
            StatusCode::CONFLICT
        );
        assert_eq!(
            viewer_error(ViewerError::UntrackableLesson).0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn busy_sessions_are_conflicts() {
        assert_eq!(session_error(SessionAccess::Busy, "Viewer").0, StatusCode::CONFLICT);
        assert_eq!(session_error(SessionAccess::NotFound, "Roster").0, StatusCode::NOT_FOUND);
        assert_eq!(session_error(SessionAccess::Forbidden, "Viewer").0, StatusCode::FORBIDDEN);
    }

    #[test]
    fn openapi_document_lists_viewer_and_roster_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/viewers/{id}/complete"));
        assert!(doc.paths.paths.contains_key("/rosters/{id}/image"));
        assert!(doc.paths.paths.contains_key("/certificates/verify/{certificate_id}"));
    }
}
