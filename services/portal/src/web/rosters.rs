//! services/portal/src/web/rosters.rs
//!
//! Axum handlers for the duty-roster composer. A roster session is created for
//! a team, filled from a pasted attendance list, edited slot by slot and then
//! exported as announcement text or as the annotated diagram.

use crate::web::middleware::AccessToken;
use crate::web::rest::{port_error, roster_error, session_error, HandlerError};
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use ministry_core::ports::TeamService;
use ministry_core::roster::{Affinity, SLOTS};
use ministry_core::RosterComposer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateRosterRequest {
    pub team_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct AttendanceRequest {
    /// One `Name - status` entry per line, as pasted from the group chat.
    pub text: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SlotRequest {
    /// An empty name clears the slot.
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct SlotView {
    pub index: usize,
    pub key: String,
    pub label: String,
    pub section: String,
    /// `header`, `female`, `male` or `neutral`.
    pub affinity: String,
    pub assignable: bool,
    pub name: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct RosterSnapshot {
    pub session_id: Uuid,
    pub team_name: String,
    pub attendance: String,
    pub slots: Vec<SlotView>,
    pub message: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn affinity_name(affinity: Affinity) -> &'static str {
    match affinity {
        Affinity::Header => "header",
        Affinity::Female => "female",
        Affinity::Male => "male",
        Affinity::Neutral => "neutral",
    }
}

impl RosterSnapshot {
    fn build(session_id: Uuid, composer: &RosterComposer) -> Self {
        let slots = SLOTS
            .iter()
            .zip(composer.assignment())
            .enumerate()
            .map(|(index, (slot, name))| SlotView {
                index,
                key: slot.key.to_string(),
                label: slot.label.to_string(),
                section: slot.section.title().to_string(),
                affinity: affinity_name(slot.affinity).to_string(),
                assignable: slot.is_assignable(),
                name: (!name.is_empty()).then(|| name.clone()),
            })
            .collect();

        Self {
            session_id,
            team_name: composer.team_name().to_string(),
            attendance: composer.attendance().to_string(),
            slots,
            message: composer.message().map(str::to_string),
        }
    }
}

/// Lowercase ASCII file stem for the exported diagram, e.g. `escala-obreiros`.
fn export_file_name(team_name: &str) -> String {
    let normalized = ministry_core::roster::attendance::normalize(team_name);
    let mut slug = String::with_capacity(normalized.len());
    for c in normalized.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "escala.png".to_string()
    } else {
        format!("escala-{slug}.png")
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Start a roster for a team. The team name labels the announcement.
#[utoipa::path(
    post,
    path = "/rosters",
    request_body = CreateRosterRequest,
    responses(
        (status = 201, description = "Roster session created", body = RosterSnapshot),
        (status = 404, description = "Team not found"),
        (status = 502, description = "Platform API unavailable")
    ),
    security(("bearer" = []))
)]
pub async fn create_roster_handler(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Json(req): Json<CreateRosterRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let api = state.api.with_token(token.0.clone());
    let team = api.fetch_team(&req.team_id).await.map_err(|e| {
        error!("Failed to fetch team {}: {:?}", req.team_id, e);
        port_error(e)
    })?;

    let composer = RosterComposer::new(team.name);
    let snapshot_composer = composer.clone();
    let session_id = state.rosters.insert(&token, composer);
    info!("Opened roster session {} for team {}", session_id, req.team_id);

    Ok((
        StatusCode::CREATED,
        Json(RosterSnapshot::build(session_id, &snapshot_composer)),
    ))
}

#[utoipa::path(
    get,
    path = "/rosters/{id}",
    params(("id" = Uuid, Path, description = "Roster session id")),
    responses(
        (status = 200, description = "Current roster state", body = RosterSnapshot),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Session busy")
    ),
    security(("bearer" = []))
)]
pub async fn get_roster_handler(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Path(id): Path<Uuid>,
) -> Result<Json<RosterSnapshot>, HandlerError> {
    let composer = state
        .rosters
        .try_acquire(id, &token)
        .map_err(|e| session_error(e, "Roster"))?;
    Ok(Json(RosterSnapshot::build(id, &composer)))
}

#[utoipa::path(
    put,
    path = "/rosters/{id}/attendance",
    params(("id" = Uuid, Path, description = "Roster session id")),
    request_body = AttendanceRequest,
    responses(
        (status = 200, description = "Attendance text stored", body = RosterSnapshot),
        (status = 403, description = "Session opened by another user"),
        (status = 404, description = "Unknown session")
    ),
    security(("bearer" = []))
)]
pub async fn set_attendance_handler(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Path(id): Path<Uuid>,
    Json(req): Json<AttendanceRequest>,
) -> Result<Json<RosterSnapshot>, HandlerError> {
    let mut composer = state
        .rosters
        .try_acquire(id, &token)
        .map_err(|e| session_error(e, "Roster"))?;
    composer.set_attendance(req.text);
    Ok(Json(RosterSnapshot::build(id, &composer)))
}

/// Replace every slot with an assignment drawn from the confirmed names.
#[utoipa::path(
    post,
    path = "/rosters/{id}/fill",
    params(("id" = Uuid, Path, description = "Roster session id")),
    responses(
        (status = 200, description = "Slots filled", body = RosterSnapshot),
        (status = 403, description = "Session opened by another user"),
        (status = 404, description = "Unknown session")
    ),
    security(("bearer" = []))
)]
pub async fn fill_roster_handler(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Path(id): Path<Uuid>,
) -> Result<Json<RosterSnapshot>, HandlerError> {
    let mut composer = state
        .rosters
        .try_acquire(id, &token)
        .map_err(|e| session_error(e, "Roster"))?;
    composer.fill_confirmed();
    Ok(Json(RosterSnapshot::build(id, &composer)))
}

#[utoipa::path(
    put,
    path = "/rosters/{id}/slots/{index}",
    params(
        ("id" = Uuid, Path, description = "Roster session id"),
        ("index" = usize, Path, description = "Slot index in catalog order")
    ),
    request_body = SlotRequest,
    responses(
        (status = 200, description = "Slot updated", body = RosterSnapshot),
        (status = 404, description = "Unknown session or slot"),
        (status = 422, description = "Slot is a header")
    ),
    security(("bearer" = []))
)]
pub async fn set_slot_handler(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(req): Json<SlotRequest>,
) -> Result<Json<RosterSnapshot>, HandlerError> {
    let mut composer = state
        .rosters
        .try_acquire(id, &token)
        .map_err(|e| session_error(e, "Roster"))?;
    composer.set_slot(index, &req.name).map_err(roster_error)?;
    Ok(Json(RosterSnapshot::build(id, &composer)))
}

/// Render the announcement text from the current slots.
#[utoipa::path(
    post,
    path = "/rosters/{id}/message",
    params(("id" = Uuid, Path, description = "Roster session id")),
    responses(
        (status = 200, description = "Announcement text", body = MessageResponse),
        (status = 403, description = "Session opened by another user"),
        (status = 404, description = "Unknown session")
    ),
    security(("bearer" = []))
)]
pub async fn generate_message_handler(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, HandlerError> {
    let mut composer = state
        .rosters
        .try_acquire(id, &token)
        .map_err(|e| session_error(e, "Roster"))?;
    let message = composer.generate_message().to_string();
    Ok(Json(MessageResponse { message }))
}

/// Download the diagram with every assigned name drawn at its position.
#[utoipa::path(
    get,
    path = "/rosters/{id}/image",
    params(("id" = Uuid, Path, description = "Roster session id")),
    responses(
        (status = 200, description = "PNG image", body = Vec<u8>, content_type = "image/png"),
        (status = 404, description = "Unknown session"),
        (status = 500, description = "Image could not be encoded")
    ),
    security(("bearer" = []))
)]
pub async fn roster_image_handler(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let composer = {
        let guard = state
            .rosters
            .try_acquire(id, &token)
            .map_err(|e| session_error(e, "Roster"))?;
        RosterComposer::clone(&guard)
    };
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(composer.team_name())
    );

    let renderer = state.renderer.clone();
    let png = tokio::task::spawn_blocking(move || renderer.render_png(&composer))
        .await
        .map_err(|e| {
            error!("Roster render task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render roster".to_string())
        })?
        .map_err(|e| {
            error!("Failed to encode roster image: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render roster".to_string())
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        png,
    ))
}

/// Clear attendance, slots and message. The team stays.
#[utoipa::path(
    post,
    path = "/rosters/{id}/reset",
    params(("id" = Uuid, Path, description = "Roster session id")),
    responses(
        (status = 200, description = "Roster cleared", body = RosterSnapshot),
        (status = 403, description = "Session opened by another user"),
        (status = 404, description = "Unknown session")
    ),
    security(("bearer" = []))
)]
pub async fn reset_roster_handler(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Path(id): Path<Uuid>,
) -> Result<Json<RosterSnapshot>, HandlerError> {
    let mut composer = state
        .rosters
        .try_acquire(id, &token)
        .map_err(|e| session_error(e, "Roster"))?;
    composer.reset();
    Ok(Json(RosterSnapshot::build(id, &composer)))
}

#[utoipa::path(
    delete,
    path = "/rosters/{id}",
    params(("id" = Uuid, Path, description = "Roster session id")),
    responses(
        (status = 204, description = "Session closed"),
        (status = 403, description = "Session opened by another user"),
        (status = 404, description = "Unknown session")
    ),
    security(("bearer" = []))
)]
pub async fn delete_roster_handler(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    state
        .rosters
        .remove(id, &token)
        .map_err(|e| session_error(e, "Roster"))?;
    Ok(StatusCode::NO_CONTENT)
}
