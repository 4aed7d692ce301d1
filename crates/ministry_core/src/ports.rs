//! crates/ministry_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core uses to reach the remote
//! platform API. These traits form the boundary of the hexagonal architecture,
//! allowing the gate and the composer to stay independent of HTTP.

use async_trait::async_trait;

use crate::domain::{CertificateGrant, CertificateVerification, Course, Progress, Team};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the transport (network, HTTP status, JSON).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CourseService: Send + Sync {
    /// Fetches a course definition, modules or legacy lessons included.
    async fn fetch_course(&self, course_id: &str) -> PortResult<Course>;
}

#[async_trait]
pub trait ProgressService: Send + Sync {
    /// Fetches the caller's progress for a course. The server creates the
    /// record on first access.
    async fn fetch_progress(&self, course_id: &str) -> PortResult<Progress>;

    /// Marks a lesson as completed and returns the updated record.
    /// Completing an already completed lesson must not double-count.
    async fn complete_lesson(
        &self,
        course_id: &str,
        module_id: &str,
        lesson_id: &str,
    ) -> PortResult<Progress>;

    async fn update_watch_time(
        &self,
        course_id: &str,
        module_id: &str,
        lesson_id: &str,
        watched_secs: u32,
    ) -> PortResult<Progress>;
}

#[async_trait]
pub trait CertificateService: Send + Sync {
    /// Issues the certificate for a completed course. Not safe to repeat.
    async fn generate_certificate(&self, course_id: &str) -> PortResult<CertificateGrant>;

    /// Public lookup, no credentials required.
    async fn verify_certificate(&self, certificate_id: &str)
        -> PortResult<CertificateVerification>;
}

#[async_trait]
pub trait TeamService: Send + Sync {
    async fn fetch_team(&self, team_id: &str) -> PortResult<Team>;
}
