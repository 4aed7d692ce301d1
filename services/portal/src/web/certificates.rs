//! services/portal/src/web/certificates.rs
//!
//! Public certificate verification. No token is required; anyone holding a
//! certificate id can check it.

use crate::web::rest::{port_error, HandlerError};
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use ministry_core::ports::CertificateService;
use ministry_core::CertificateVerification;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct VerificationResponse {
    pub certificate_id: String,
    pub valid: bool,
    pub student_name: String,
    pub course_name: String,
    pub course_category: String,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<CertificateVerification> for VerificationResponse {
    // The student's email is not exposed publicly.
    fn from(v: CertificateVerification) -> Self {
        Self {
            certificate_id: v.certificate_id,
            valid: v.valid,
            student_name: v.student_name,
            course_name: v.course_name,
            course_category: v.course_category,
            completed_at: v.completed_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/certificates/verify/{certificate_id}",
    params(("certificate_id" = String, Path, description = "Certificate id printed on the document")),
    responses(
        (status = 200, description = "Certificate found", body = VerificationResponse),
        (status = 404, description = "No certificate with this id"),
        (status = 502, description = "Platform API unavailable")
    )
)]
pub async fn verify_certificate_handler(
    State(state): State<Arc<AppState>>,
    Path(certificate_id): Path<String>,
) -> Result<Json<VerificationResponse>, HandlerError> {
    let verification = state
        .api
        .verify_certificate(&certificate_id)
        .await
        .map_err(|e| {
            warn!("Verification of certificate {} failed: {:?}", certificate_id, e);
            port_error(e)
        })?;
    Ok(Json(verification.into()))
}
