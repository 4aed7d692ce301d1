//! services/portal/src/web/viewers.rs
//!
//! Axum handlers for the course viewer: loading a course with its progress,
//! selecting and completing lessons, and issuing the certificate.

use crate::web::middleware::AccessToken;
use crate::web::rest::{port_error, session_error, viewer_error, HandlerError};
use crate::web::state::{AppState, ViewerSession};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use ministry_core::gate::certificate_link;
use ministry_core::video::{duration_label, embed_url};
use ministry_core::{CourseViewer, LessonPosition, LessonState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateViewerRequest {
    pub course_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SelectLessonRequest {
    pub module: usize,
    pub lesson: usize,
}

#[derive(Deserialize, ToSchema)]
pub struct WatchTimeRequest {
    pub watched_secs: u32,
}

#[derive(Serialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LessonStateView {
    Locked,
    Unlocked,
    Completed,
}

impl From<LessonState> for LessonStateView {
    fn from(state: LessonState) -> Self {
        match state {
            LessonState::Locked => Self::Locked,
            LessonState::Unlocked => Self::Unlocked,
            LessonState::Completed => Self::Completed,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LessonView {
    pub id: String,
    pub title: String,
    pub state: LessonStateView,
    pub embed_url: Option<String>,
    pub duration: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ModuleView {
    pub id: String,
    pub title: String,
    pub lessons: Vec<LessonView>,
}

#[derive(Serialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionView {
    pub module: usize,
    pub lesson: usize,
}

impl From<LessonPosition> for PositionView {
    fn from(pos: LessonPosition) -> Self {
        Self {
            module: pos.module,
            lesson: pos.lesson,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ProgressView {
    pub percentage: f32,
    pub completed_lessons: usize,
    pub completed: bool,
    pub certificate_issued: bool,
}

/// Everything the viewer screen needs to render, recomputed on every request.
#[derive(Serialize, ToSchema)]
pub struct ViewerSnapshot {
    pub session_id: Uuid,
    pub course_id: String,
    pub course_title: String,
    pub modules: Vec<ModuleView>,
    /// `None` for a course without lessons; completion is then unavailable.
    pub current: Option<PositionView>,
    pub current_completed: bool,
    pub progress: ProgressView,
    pub certificate_available: bool,
    pub certificate_url: Option<String>,
}

impl ViewerSnapshot {
    fn build(session_id: Uuid, viewer: &CourseViewer) -> Self {
        let states = viewer.gate_map();
        let modules = viewer
            .modules()
            .iter()
            .zip(states)
            .map(|(module, states)| ModuleView {
                id: module.id.clone(),
                title: module.title.clone(),
                lessons: module
                    .lessons
                    .iter()
                    .zip(states)
                    .map(|(lesson, state)| LessonView {
                        id: lesson.id.clone(),
                        title: lesson.title.clone(),
                        state: state.into(),
                        embed_url: lesson.video_url.as_deref().map(embed_url),
                        duration: lesson.duration_secs.map(duration_label),
                    })
                    .collect(),
            })
            .collect();

        let progress = viewer.progress();
        Self {
            session_id,
            course_id: viewer.course().id.clone(),
            course_title: viewer.course().title.clone(),
            modules,
            current: viewer.current().map(PositionView::from),
            current_completed: viewer.is_current_completed(),
            progress: ProgressView {
                percentage: progress.percentage,
                completed_lessons: progress.completed_count(),
                completed: progress.completed,
                certificate_issued: progress.certificate_issued,
            },
            certificate_available: viewer.certificate_available(),
            certificate_url: certificate_link(progress).map(str::to_string),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CompleteLessonResponse {
    pub snapshot: ViewerSnapshot,
    /// Where the pointer moved; absent when the course was already at its end.
    pub advanced_to: Option<PositionView>,
    /// Set once, on the completion that finished the course.
    pub course_finished: bool,
}

#[derive(Serialize, ToSchema)]
pub struct CertificateResponse {
    pub certificate_url: String,
    pub certificate_id: String,
    pub student_name: String,
    pub course_name: String,
    pub completed_at: Option<DateTime<Utc>>,
    /// Public page where anyone can check the certificate.
    pub verify_path: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Open a course in a new viewer session.
///
/// Fetches the course definition and the caller's progress concurrently.
#[utoipa::path(
    post,
    path = "/viewers",
    request_body = CreateViewerRequest,
    responses(
        (status = 201, description = "Viewer session created", body = ViewerSnapshot),
        (status = 401, description = "Missing or rejected token"),
        (status = 404, description = "Course not found"),
        (status = 502, description = "Platform API unavailable")
    ),
    security(("bearer" = []))
)]
pub async fn create_viewer_handler(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Json(req): Json<CreateViewerRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let api = state.api.with_token(token.0.clone());
    let viewer = CourseViewer::load(&api, &api, &req.course_id)
        .await
        .map_err(|e| {
            error!("Failed to load course {}: {:?}", req.course_id, e);
            port_error(e)
        })?;

    let session = ViewerSession { viewer, api };
    let snapshot_viewer = session.viewer.clone();
    let session_id = state.viewers.insert(&token, session);
    info!("Opened viewer session {} for course {}", session_id, req.course_id);

    Ok((
        StatusCode::CREATED,
        Json(ViewerSnapshot::build(session_id, &snapshot_viewer)),
    ))
}

#[utoipa::path(
    get,
    path = "/viewers/{id}",
    params(("id" = Uuid, Path, description = "Viewer session id")),
    responses(
        (status = 200, description = "Current viewer state", body = ViewerSnapshot),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Session busy")
    ),
    security(("bearer" = []))
)]
pub async fn get_viewer_handler(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Path(id): Path<Uuid>,
) -> Result<Json<ViewerSnapshot>, HandlerError> {
    let session = state
        .viewers
        .try_acquire(id, &token)
        .map_err(|e| session_error(e, "Viewer"))?;
    Ok(Json(ViewerSnapshot::build(id, &session.viewer)))
}

/// Move the current-lesson pointer. Locked lessons are refused.
#[utoipa::path(
    post,
    path = "/viewers/{id}/select",
    params(("id" = Uuid, Path, description = "Viewer session id")),
    request_body = SelectLessonRequest,
    responses(
        (status = 200, description = "Lesson selected", body = ViewerSnapshot),
        (status = 403, description = "Lesson is locked"),
        (status = 404, description = "Unknown session or lesson")
    ),
    security(("bearer" = []))
)]
pub async fn select_lesson_handler(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectLessonRequest>,
) -> Result<Json<ViewerSnapshot>, HandlerError> {
    let mut session = state
        .viewers
        .try_acquire(id, &token)
        .map_err(|e| session_error(e, "Viewer"))?;
    session
        .viewer
        .select(LessonPosition::new(req.module, req.lesson))
        .map_err(viewer_error)?;
    Ok(Json(ViewerSnapshot::build(id, &session.viewer)))
}

/// Complete the current lesson and advance to the next one.
#[utoipa::path(
    post,
    path = "/viewers/{id}/complete",
    params(("id" = Uuid, Path, description = "Viewer session id")),
    responses(
        (status = 200, description = "Lesson completed", body = CompleteLessonResponse),
        (status = 403, description = "Current lesson is locked"),
        (status = 422, description = "Current lesson has no identifier"),
        (status = 409, description = "No current lesson, or a call is already in flight"),
        (status = 502, description = "Platform API unavailable; nothing changed")
    ),
    security(("bearer" = []))
)]
pub async fn complete_lesson_handler(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompleteLessonResponse>, HandlerError> {
    let mut session = state
        .viewers
        .try_acquire(id, &token)
        .map_err(|e| session_error(e, "Viewer"))?;
    let ViewerSession { viewer, api } = &mut *session;

    let outcome = viewer.complete_current(&*api).await.map_err(viewer_error)?;
    if outcome.course_finished {
        info!("Viewer session {} finished course {}", id, viewer.course().id);
    }

    Ok(Json(CompleteLessonResponse {
        snapshot: ViewerSnapshot::build(id, viewer),
        advanced_to: outcome.advanced_to.map(PositionView::from),
        course_finished: outcome.course_finished,
    }))
}

#[utoipa::path(
    post,
    path = "/viewers/{id}/watch-time",
    params(("id" = Uuid, Path, description = "Viewer session id")),
    request_body = WatchTimeRequest,
    responses(
        (status = 200, description = "Watch time recorded", body = ViewerSnapshot),
        (status = 409, description = "No current lesson, or session busy"),
        (status = 422, description = "Current lesson has no identifier")
    ),
    security(("bearer" = []))
)]
pub async fn watch_time_handler(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Path(id): Path<Uuid>,
    Json(req): Json<WatchTimeRequest>,
) -> Result<Json<ViewerSnapshot>, HandlerError> {
    let mut session = state
        .viewers
        .try_acquire(id, &token)
        .map_err(|e| session_error(e, "Viewer"))?;
    let ViewerSession { viewer, api } = &mut *session;

    viewer
        .record_watch_time(&*api, req.watched_secs)
        .await
        .map_err(viewer_error)?;
    Ok(Json(ViewerSnapshot::build(id, viewer)))
}

/// Issue the course certificate. Only offered once, after completion.
#[utoipa::path(
    post,
    path = "/viewers/{id}/certificate",
    params(("id" = Uuid, Path, description = "Viewer session id")),
    responses(
        (status = 201, description = "Certificate issued", body = CertificateResponse),
        (status = 409, description = "Course not completed or certificate already issued"),
        (status = 502, description = "Platform API unavailable; nothing changed")
    ),
    security(("bearer" = []))
)]
pub async fn issue_certificate_handler(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let mut session = state
        .viewers
        .try_acquire(id, &token)
        .map_err(|e| session_error(e, "Viewer"))?;
    let ViewerSession { viewer, api } = &mut *session;

    let grant = viewer.issue_certificate(&*api).await.map_err(viewer_error)?;
    let response = CertificateResponse {
        verify_path: format!("/certificates/verify/{}", grant.certificate_id),
        certificate_url: grant.certificate_url,
        certificate_id: grant.certificate_id,
        student_name: grant.student_name,
        course_name: grant.course_name,
        completed_at: grant.completed_at,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/viewers/{id}",
    params(("id" = Uuid, Path, description = "Viewer session id")),
    responses(
        (status = 204, description = "Session closed"),
        (status = 403, description = "Session opened by another user"),
        (status = 404, description = "Unknown session")
    ),
    security(("bearer" = []))
)]
pub async fn delete_viewer_handler(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    state
        .viewers
        .remove(id, &token)
        .map_err(|e| session_error(e, "Viewer"))?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ministry_core::{Course, CourseContent, Lesson, LessonMarker, Module, Progress};

    fn viewer(done: &[&str], completed: bool) -> CourseViewer {
        let lessons = ["a", "b"]
            .iter()
            .enumerate()
            .map(|(i, id)| Lesson {
                id: id.to_string(),
                title: id.to_uppercase(),
                description: None,
                video_url: Some("https://www.youtube.com/watch?v=XYZ123".to_string()),
                duration_secs: Some(300),
                order: i as i32,
            })
            .collect();
        let course = Course {
            id: "c1".to_string(),
            title: "Batismo".to_string(),
            description: String::new(),
            category: String::new(),
            content: CourseContent::Modules(vec![Module {
                id: "m1".to_string(),
                title: "Único".to_string(),
                order: 1,
                lessons,
            }]),
        };
        let progress = Progress {
            id: "p1".to_string(),
            course_id: "c1".to_string(),
            completed_lessons: done
                .iter()
                .map(|l| LessonMarker {
                    module_id: "m1".to_string(),
                    lesson_id: l.to_string(),
                    completed: true,
                    completed_at: None,
                    watched_secs: 0,
                })
                .collect(),
            percentage: done.len() as f32 * 50.0,
            completed,
            certificate_issued: false,
            certificate_url: None,
            certificate_id: None,
            last_accessed_at: None,
            completed_at: None,
        };
        CourseViewer::new(course, progress)
    }

    #[test]
    fn snapshot_carries_gate_states_and_video_details() {
        let snapshot = ViewerSnapshot::build(Uuid::nil(), &viewer(&["a"], false));
        let lessons = &snapshot.modules[0].lessons;

        assert_eq!(lessons[0].state, LessonStateView::Completed);
        assert_eq!(lessons[1].state, LessonStateView::Unlocked);
        assert_eq!(lessons[0].duration.as_deref(), Some("5 min"));
        assert!(lessons[0]
            .embed_url
            .as_deref()
            .unwrap()
            .starts_with("https://www.youtube-nocookie.com/embed/XYZ123"));
        assert_eq!(snapshot.current, Some(PositionView { module: 0, lesson: 0 }));
        assert!(snapshot.current_completed);
        assert!(!snapshot.certificate_available);
    }

    #[test]
    fn snapshot_offers_certificate_only_when_completed() {
        let snapshot = ViewerSnapshot::build(Uuid::nil(), &viewer(&["a", "b"], true));
        assert!(snapshot.certificate_available);
        assert_eq!(snapshot.progress.completed_lessons, 2);
        assert_eq!(snapshot.certificate_url, None);
    }

    #[test]
    fn snapshot_serializes_states_in_snake_case() {
        let snapshot = ViewerSnapshot::build(Uuid::nil(), &viewer(&[], false));
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["modules"][0]["lessons"][1]["state"], "locked");
    }
}
